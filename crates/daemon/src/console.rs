//! Terminal feedback surface

use authfetch_core::FeedbackObserver;

/// Prints status messages, errors to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

impl FeedbackObserver for ConsoleObserver {
    fn on_message(&self, message: &str, is_error: bool) {
        if is_error {
            eprintln!("error: {message}");
        } else {
            println!("{message}");
        }
    }
}
