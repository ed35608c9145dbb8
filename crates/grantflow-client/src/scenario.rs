//! Scenario files.
//!
//! One step per line, comma separated:
//!
//! ```text
//! 123456789012345,REQUEST,1
//! 123456789012345,READ,Files
//! ```
//!
//! `REQUEST` runs the request/approve/issue sequence; its flag enables
//! auto-refresh. Any other operation is a delegated action on a resource.
//! Blank lines are skipped.

use crate::error::ClientError;

const REQUEST: &str = "REQUEST";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Request {
        user_id: String,
        auto_refresh: bool,
    },
    Action {
        user_id: String,
        operation: String,
        resource: String,
    },
}

impl Step {
    pub fn user_id(&self) -> &str {
        match self {
            Self::Request { user_id, .. } | Self::Action { user_id, .. } => user_id,
        }
    }
}

/// Parse a whole scenario file.
pub fn parse_scenario(text: &str) -> Result<Vec<Step>, ClientError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_step(line.trim()).map_err(|reason| ClientError::Scenario {
            line: i + 1,
            reason,
        }))
        .collect()
}

fn parse_step(line: &str) -> Result<Step, String> {
    let mut fields = line.splitn(3, ',').map(str::trim);
    let (Some(user_id), Some(operation), Some(arg)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(format!("expected 3 fields, got {line:?}"));
    };
    if user_id.is_empty() || operation.is_empty() {
        return Err(format!("empty field in {line:?}"));
    }

    if operation == REQUEST {
        let auto_refresh = match arg {
            "0" => false,
            "1" => true,
            other => return Err(format!("refresh flag must be 0 or 1, got {other:?}")),
        };
        return Ok(Step::Request {
            user_id: user_id.to_string(),
            auto_refresh,
        });
    }

    Ok(Step::Action {
        user_id: user_id.to_string(),
        operation: operation.to_string(),
        resource: arg.to_string(),
    })
}
