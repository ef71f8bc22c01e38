use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use sio_filter::{HandlerError, HandlerResult};
use sio_types::ErrorCode;
use tracing::{error, warn};

/// Run a handler operation and fold every way it can end into an [`ErrorCode`].
///
/// Classified errors pass through. Recognized faults (I/O errors, failures
/// with a message) and panics are logged and become
/// [`ErrorCode::ConsoleError`].
pub(crate) fn guard<F>(action: &str, handler: &str, op: F) -> ErrorCode
where
    F: FnOnce() -> HandlerResult<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(op)) {
        Ok(Ok(())) => ErrorCode::NoError,
        Ok(Err(HandlerError::Code(code))) => code,
        Ok(Err(err)) => {
            warn!(filter = handler, %err, "caught error while {action} file");
            ErrorCode::ConsoleError
        }
        Err(payload) => {
            error!(
                filter = handler,
                panic = %panic_message(payload.as_ref()),
                "unhandled fault while {action} file"
            );
            ErrorCode::ConsoleError
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
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
    fn classified_codes_pass_through() {
        assert_eq!(guard("loading", "T", || Ok(())), ErrorCode::NoError);
        assert_eq!(
            guard("loading", "T", || Err(ErrorCode::WrongFileType.into())),
            ErrorCode::WrongFileType
        );
        assert_eq!(
            guard("saving", "T", || Err(ErrorCode::CanceledByUser.into())),
            ErrorCode::CanceledByUser
        );
    }

    #[test]
    fn recognized_faults_become_console_error() {
        assert_eq!(
            guard("loading", "T", || Err(HandlerError::failure("bad index"))),
            ErrorCode::ConsoleError
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(
            guard("saving", "T", || Err(io.into())),
            ErrorCode::ConsoleError
        );
    }

    #[test]
    fn panics_become_console_error() {
        assert_eq!(
            guard("loading", "T", || panic!("index out of range")),
            ErrorCode::ConsoleError
        );
    }

    #[test]
    fn panic_messages_are_extracted() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
