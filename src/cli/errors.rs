//! Error display formatting for the CLI.

use crate::error::Error;

/// Prints an error message, either as JSON or user-friendly format.
pub fn print_error_with_json(error: &Error, json_format: bool) {
    if !json_format {
        print_error(error);
        return;
    }
    let json_error = error.to_json();
    let Ok(json_output) = serde_json::to_string_pretty(&json_error) else {
        print_error(error);
        return;
    };
    eprintln!("{json_output}");
}

/// Prints a user-friendly error message with per-field details and hints.
pub fn print_error(error: &Error) {
    let json_error = error.to_json();
    eprintln!("{} Error\n{}", json_error.error_type, json_error.message);

    if let Error::Request(transformed) = error {
        let fields: Vec<_> = transformed
            .value
            .form_errors
            .iter()
            .filter(|(_, messages)| {
                messages.len() != 1 || messages[0] != transformed.value.message_for_notification
            })
            .collect();
        if !fields.is_empty() {
            eprintln!();
            for (field, messages) in fields {
                eprintln!("  {field}: {}", messages.join("; "));
            }
        }
        if let Some(status) = transformed.status {
            eprintln!("\nHTTP status: {status}");
        }
        return;
    }

    if let Some(context) = json_error.context {
        eprintln!("\nHint: {context}");
    }
}
