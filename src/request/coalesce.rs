// src/request/coalesce.rs

//! Argument token coalescing.
//!
//! The shell hands us package specifiers in pieces: `satchel = 1.2.15`
//! arrives as three tokens, `satchel>= 1.2.15` as two. This pass merges
//! such sequences back into single specifier strings before any further
//! parsing. An operator token can only bind when it has an operand on
//! both sides; at the very start or end of the argument list it is left
//! alone and treated as an ordinary specifier.

use std::collections::HashSet;
use std::mem;
use tracing::debug;

const OPERATORS: [&str; 6] = ["=", "==", "<", ">", "<=", ">="];

fn is_operator(token: &str) -> bool {
    OPERATORS.contains(&token)
}

fn ends_with_operator_char(token: &str) -> bool {
    token.ends_with(['=', '<', '>'])
}

fn starts_with_operator_char(token: &str) -> bool {
    token.starts_with(['=', '<', '>'])
}

/// Merge raw argument tokens into complete specifier strings.
///
/// The result preserves first-occurrence order; an argument that
/// coalesces to a string already produced is dropped. Running the output
/// through this function again yields the same list.
pub fn coalesce_args<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    let argc = args.len();
    let mut out: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut emit = |arg: String| {
        if seen.insert(arg.clone()) {
            out.push(arg);
        }
    };

    let mut arg = String::new();
    let mut op_pending = false;

    for (i, raw) in args.iter().enumerate() {
        let mut tmp = raw.as_ref().to_string();

        if op_pending {
            // forced merge after an operator
            arg.push_str(&tmp);
            op_pending = false;
            tmp.clear();
        } else if is_operator(&tmp) {
            // standalone operator: binds only with operands on both sides
            if i > 0 && i < argc - 1 {
                op_pending = true;
            }
        } else if ends_with_operator_char(&tmp) && i < argc - 1 {
            // operator glued to the end of a token, e.g. 'satchel='
            if !arg.is_empty() {
                emit(mem::take(&mut arg));
            }
            arg = tmp;
            op_pending = true;
            continue;
        } else if i > 0 && starts_with_operator_char(&tmp) {
            // operator glued to the start of a token, e.g. '>=3.2.1'
            arg.push_str(&tmp);
            tmp.clear();
        }

        if op_pending {
            arg.push_str(&tmp);
        } else {
            if !arg.is_empty() {
                emit(mem::take(&mut arg));
            }
            arg = tmp;
        }
    }

    if !arg.is_empty() {
        emit(arg);
    }

    debug!(
        "args received: {:?}",
        args.iter().map(|a| a.as_ref()).collect::<Vec<&str>>()
    );
    debug!("args compiled: {:?}", out);

    out
}
