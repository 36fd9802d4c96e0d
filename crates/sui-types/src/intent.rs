//! Intent prefixes for domain-separated signing.

/// What kind of message is being signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IntentScope {
    TransactionData = 0,
    TransactionEffects = 1,
    CheckpointSummary = 2,
    PersonalMessage = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Intent {
    pub scope: IntentScope,
    pub version: u8,
    pub app_id: u8,
}

impl Intent {
    /// `[0, 0, 0]`: transaction data, V0, Sui app.
    pub fn sui_transaction() -> Self {
        Self {
            scope: IntentScope::TransactionData,
            version: 0,
            app_id: 0,
        }
    }

    pub fn personal_message() -> Self {
        Self {
            scope: IntentScope::PersonalMessage,
            version: 0,
            app_id: 0,
        }
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [self.scope as u8, self.version, self.app_id]
    }
}

/// An intent together with the serialized message it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentMessage<'a> {
    pub intent: Intent,
    pub value: &'a [u8],
}

impl<'a> IntentMessage<'a> {
    pub fn new(intent: Intent, value: &'a [u8]) -> Self {
        Self { intent, value }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(3 + self.value.len());
        bytes.extend_from_slice(&self.intent.to_bytes());
        bytes.extend_from_slice(self.value);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_bytes() {
        assert_eq!(Intent::sui_transaction().to_bytes(), [0, 0, 0]);
        assert_eq!(Intent::personal_message().to_bytes(), [3, 0, 0]);
        let message = IntentMessage::new(Intent::sui_transaction(), &[7, 8]);
        assert_eq!(message.to_bytes(), vec![0, 0, 0, 7, 8]);
    }
}
