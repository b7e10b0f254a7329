//! Mock EV contract for coordinator testing.
//!
//! A controllable [`ContractInvoker`] implementation: scripts the next
//! response, injects transport failures, and records every invocation for
//! assertion. Handles are cheap clones sharing one state.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::invoke::{ContractInvoker, InvokeError, InvokeResponse, STATUS_SUCCESS};

/// One recorded cross-contract invocation.
#[derive(Debug, Clone)]
pub struct RecordedInvocation {
    /// Contract name the call addressed.
    pub target: String,
    /// Positional byte arguments, as received.
    pub args: Vec<Vec<u8>>,
    /// Channel the call addressed.
    pub channel: String,
}

struct MockState {
    response: InvokeResponse,
    transport_failures: usize,
    invocations: Vec<RecordedInvocation>,
}

/// Scriptable EV contract stand-in.
pub struct MockEvContract {
    state: Arc<RwLock<MockState>>,
}

impl MockEvContract {
    /// Creates a mock that acknowledges every call with status 200 and an
    /// empty payload.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockState {
                response: InvokeResponse {
                    status: STATUS_SUCCESS,
                    payload: Vec::new(),
                    message: String::new(),
                },
                transport_failures: 0,
                invocations: Vec::new(),
            })),
        }
    }

    /// Scripts the response returned to subsequent invocations.
    pub fn respond_with(&self, status: i32, payload: &[u8], message: &str) {
        self.state.write().response = InvokeResponse {
            status,
            payload: payload.to_vec(),
            message: message.to_string(),
        };
    }

    /// Makes the next `count` invocations fail at the transport layer.
    pub fn fail_next(&self, count: usize) {
        self.state.write().transport_failures = count;
    }

    /// Returns every invocation received so far.
    pub fn invocations(&self) -> Vec<RecordedInvocation> {
        self.state.read().invocations.clone()
    }

    /// Number of invocations received so far.
    pub fn invocation_count(&self) -> usize {
        self.state.read().invocations.len()
    }
}

impl Default for MockEvContract {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockEvContract {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl ContractInvoker for MockEvContract {
    fn invoke(
        &self,
        target: &str,
        args: &[Vec<u8>],
        channel: &str,
    ) -> Result<InvokeResponse, InvokeError> {
        let mut state = self.state.write();
        state.invocations.push(RecordedInvocation {
            target: target.to_string(),
            args: args.to_vec(),
            channel: channel.to_string(),
        });

        if state.transport_failures > 0 {
            state.transport_failures -= 1;
            return Err(InvokeError::Transport {
                message: "injected transport failure".to_string(),
            });
        }

        Ok(state.response.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_records_invocations() {
        let mock = MockEvContract::new();

        let response = mock
            .invoke("EV", &[b"UpdateEVData".to_vec()], "default-channel")
            .expect("invoke");
        assert_eq!(response.status, STATUS_SUCCESS);

        assert_eq!(mock.invocation_count(), 1);
        let calls = mock.invocations();
        assert_eq!(calls[0].target, "EV");
        assert_eq!(calls[0].channel, "default-channel");
    }

    #[test]
    fn test_scripted_response() {
        let mock = MockEvContract::new();
        mock.respond_with(409, b"busy", "charger contended");

        let response = mock.invoke("EV", &[], "default-channel").expect("invoke");
        assert_eq!(response.status, 409);
        assert_eq!(response.payload, b"busy");
        assert_eq!(response.message, "charger contended");
    }

    #[test]
    fn test_transport_failure_injection() {
        let mock = MockEvContract::new();
        mock.fail_next(2);

        assert!(mock.invoke("EV", &[], "c").is_err());
        assert!(mock.invoke("EV", &[], "c").is_err());
        assert!(mock.invoke("EV", &[], "c").is_ok());

        // Failed calls are still recorded.
        assert_eq!(mock.invocation_count(), 3);
    }
}
