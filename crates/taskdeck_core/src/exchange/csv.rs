use crate::error::AppError;

/// Wrap a cell in double quotes, doubling any quote characters inside it.
pub(super) fn csv_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

pub(super) fn split_csv_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(ch);
            }
        } else {
            match ch {
                '"' => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut current)),
                _ => current.push(ch),
            }
        }
    }

    if in_quotes {
        return Err(AppError::invalid_data("unterminated quote in csv line"));
    }

    fields.push(current);
    Ok(fields)
}
