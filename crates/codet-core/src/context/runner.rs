//! Isolation boundary between the host and compiled template code

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{CodetError, Result};

/// Render task handed to a runner
pub type RenderTask<'a> = &'a mut dyn FnMut() -> Result<Option<String>>;

/// Runs artifact code behind whatever boundary the host chooses
pub trait IsolatedRunner {
    fn run(&self, task: RenderTask<'_>) -> Result<Option<String>>;
}

/// Runs the task directly on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct InProcess;

impl IsolatedRunner for InProcess {
    fn run(&self, task: RenderTask<'_>) -> Result<Option<String>> {
        task()
    }
}

/// Runs the task on the calling thread and stops a panic at the boundary,
/// reporting it as `RENDER_FAILED`
#[derive(Debug, Clone, Copy, Default)]
pub struct UnwindIsolation;

impl IsolatedRunner for UnwindIsolation {
    fn run(&self, task: RenderTask<'_>) -> Result<Option<String>> {
        match panic::catch_unwind(AssertUnwindSafe(task)) {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!("Template code panicked: {}", message);
                Err(CodetError::RenderFailed(format!(
                    "template code panicked: {}",
                    message
                )))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_process_passes_result_through() {
        let mut task = || -> Result<Option<String>> { Ok(Some("out".to_string())) };
        assert_eq!(InProcess.run(&mut task).unwrap(), Some("out".to_string()));
    }

    #[test]
    fn test_unwind_isolation_converts_panic() {
        let mut task = || -> Result<Option<String>> { panic!("boom") };
        match UnwindIsolation.run(&mut task) {
            Err(CodetError::RenderFailed(message)) => assert!(message.contains("boom")),
            other => panic!("Expected RenderFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_unwind_isolation_keeps_errors() {
        let mut task = || -> Result<Option<String>> { Err(CodetError::NotCompiled) };
        assert!(matches!(
            UnwindIsolation.run(&mut task),
            Err(CodetError::NotCompiled)
        ));
    }

    #[test]
    fn test_panic_message_formats() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let other: Box<dyn Any + Send> = Box::new(42);
        assert_eq!(panic_message(other.as_ref()), "unknown panic payload");
    }
}
