//! Line-oriented tokenizer for the pseudo-assembly text format.
//!
//! One instruction per line. The mnemonic is separated from its parameters
//! by whitespace, parameters are separated by commas, `'...'` quotes may
//! contain spaces, commas and semicolons, and `;` outside quotes starts a
//! comment. A bare `name:` at the start of a line is a label definition.

use crate::instruction::Instruction;

/// Parse source text into instructions. Malformed lines are tokenized on a
/// best-effort basis; unknown mnemonics are only detected at execution.
pub fn parse(source: &str) -> Vec<Instruction> {
    source
        .split('\n')
        .filter(|line| !line.is_empty())
        .filter_map(parse_line)
        .collect()
}

/// Tokenize a single line. Returns `None` for blank and comment-only lines.
pub fn parse_line(line: &str) -> Option<Instruction> {
    let mut fields: Vec<String> = Vec::new();
    let mut buf = String::new();
    let mut in_quotes = false;

    for c in line.trim().chars() {
        match c {
            c if c.is_whitespace() => {
                if fields.is_empty() {
                    fields.push(std::mem::take(&mut buf));
                } else if in_quotes {
                    buf.push(c);
                }
            }
            ':' => {
                if fields.is_empty() {
                    buf.push(c);
                    fields.push(buf);
                    return build(fields);
                } else if in_quotes {
                    buf.push(c);
                }
            }
            ',' => {
                if in_quotes {
                    buf.push(c);
                } else {
                    fields.push(std::mem::take(&mut buf));
                }
            }
            '\'' => {
                in_quotes = !in_quotes;
                buf.push(c);
            }
            ';' => {
                if in_quotes {
                    buf.push(c);
                } else {
                    if !buf.is_empty() {
                        fields.push(buf);
                    }
                    return build(fields);
                }
            }
            _ => buf.push(c),
        }
    }

    if !buf.is_empty() {
        fields.push(buf);
    }
    build(fields)
}

fn build(fields: Vec<String>) -> Option<Instruction> {
    let mut it = fields.into_iter();
    let name = it.next()?;
    Some(Instruction::new(name, it))
}
