use crate::cli::OutputFormat;
use registry::error::get_error_info;
use registry::RegistryError;
use serde_json::json;

pub fn emit_output(output: OutputFormat, command: &str, payload: &serde_json::Value) {
    match output {
        OutputFormat::Text => payload
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| println!("{payload}"), |msg| println!("{msg}")),
        OutputFormat::Json => println!(
            "{}",
            json!({
                "command": command,
                "status": "ok",
                "payload": payload,
            })
        ),
    }
}

pub fn emit_error(output: OutputFormat, command: &str, error: &RegistryError) {
    match output {
        OutputFormat::Text => {
            eprintln!("error: {error}");
            if let Some((_, fix)) = get_error_info(error.code()) {
                eprintln!("hint: {fix}");
            }
        }
        OutputFormat::Json => eprintln!("{}", error_envelope(command, error)),
    }
}

fn error_envelope(command: &str, error: &RegistryError) -> serde_json::Value {
    json!({
        "command": command,
        "status": "error",
        "error": {
            "code": error.code(),
            "message": error.to_string(),
            "exit_code": error.exit_code(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::error_envelope;
    use registry::RegistryError;

    #[test]
    fn error_envelope_carries_code_and_message() {
        let envelope = error_envelope("add", &RegistryError::Busy("Add student".to_string()));

        assert_eq!(envelope["status"], "error");
        assert_eq!(envelope["error"]["code"], "BUSY");
        assert_eq!(envelope["error"]["message"], "Add student already in progress");
        assert_eq!(envelope["error"]["exit_code"], 8);
    }

    #[test]
    fn validation_envelope_uses_the_user_facing_text() {
        let envelope = error_envelope(
            "search",
            &RegistryError::Validation("Please enter a student ID".to_string()),
        );

        assert_eq!(envelope["error"]["code"], "INVALID");
        assert_eq!(envelope["error"]["message"], "Please enter a student ID");
    }
}
