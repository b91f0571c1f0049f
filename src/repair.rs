//! Best-effort repair of truncated or slightly malformed JSON.
//!
//! Generation responses regularly stop mid-structure when they hit the
//! output limit, or arrive wrapped in a code fence with a sentence of
//! prose in front. This module closes unterminated strings and unbalanced
//! braces/brackets with a single-pass scanner so the strict parser gets
//! something it can work with. It is a heuristic, not a validator: the
//! output is always re-parsed strictly, and a repair that still does not
//! parse surfaces as a parse error.

/// Repair a raw generation response into parseable JSON-like text.
///
/// Idempotent: running the repair on its own output changes nothing, and
/// already-balanced input passes through untouched (modulo fence and
/// leading-prose stripping).
pub fn repair(input: &str) -> String {
  let text = strip_code_fences(input);
  let text = discard_leading_prose(text);

  let mut out = String::with_capacity(text.len() + 8);
  let mut in_string = false;
  let mut escape_next = false;
  // Unmatched openers, oldest first. The top of the stack is the most
  // recently opened unclosed structure, so closers are emitted in exactly
  // the reverse order the structures were opened.
  let mut openers: Vec<char> = Vec::new();

  for ch in text.chars() {
    out.push(ch);

    if escape_next {
      escape_next = false;
      continue;
    }

    match ch {
      '\\' => escape_next = true,
      '"' => in_string = !in_string,
      '{' | '[' if !in_string => openers.push(ch),
      '}' if !in_string => {
        if let Some(pos) = openers.iter().rposition(|&c| c == '{') {
          openers.remove(pos);
        }
      }
      ']' if !in_string => {
        if let Some(pos) = openers.iter().rposition(|&c| c == '[') {
          openers.remove(pos);
        }
      }
      _ => {}
    }
  }

  // A response cut off mid-string gets its quote back first
  if in_string {
    out.push('"');
  }

  strip_trailing_comma(&mut out);

  while let Some(opener) = openers.pop() {
    strip_trailing_comma(&mut out);
    out.push(if opener == '{' { '}' } else { ']' });
  }

  remove_commas_before_closers(&out)
}

/// Remove a trailing comma (and any whitespace after it) from the end
fn strip_trailing_comma(s: &mut String) {
  let trimmed_len = s.trim_end().len();
  if s[..trimmed_len].ends_with(',') {
    s.truncate(trimmed_len - 1);
  }
}

/// Drop leading/trailing triple-backtick fence markers, with an optional
/// language tag on the opening fence
fn strip_code_fences(input: &str) -> &str {
  let mut text = input.trim();

  if let Some(rest) = text.strip_prefix("```") {
    // Skip the language tag line ("json", "JSON", or nothing)
    text = match rest.find('\n') {
      Some(idx) => rest[idx + 1..].trim(),
      None => rest.trim(),
    };
  }

  if let Some(rest) = text.strip_suffix("```") {
    text = rest.trim_end();
  }

  text
}

/// Discard any prose preceding the first opening brace
fn discard_leading_prose(text: &str) -> &str {
  match text.find('{') {
    Some(idx) => &text[idx..],
    None => text,
  }
}

/// Remove commas that sit immediately before a closing brace/bracket
/// anywhere in the text. Structures that were closed mid-scan can be left
/// with `", }"` after truncation stripping; this sweep is string-aware so
/// commas inside values survive.
fn remove_commas_before_closers(text: &str) -> String {
  let chars: Vec<char> = text.chars().collect();
  let mut out = String::with_capacity(text.len());
  let mut in_string = false;
  let mut escape_next = false;

  for (i, &ch) in chars.iter().enumerate() {
    if escape_next {
      escape_next = false;
      out.push(ch);
      continue;
    }

    match ch {
      '\\' => {
        escape_next = true;
        out.push(ch);
      }
      '"' => {
        in_string = !in_string;
        out.push(ch);
      }
      ',' if !in_string => {
        let next_significant = chars[i + 1..].iter().find(|c| !c.is_whitespace());
        if !matches!(next_significant, Some('}') | Some(']')) {
          out.push(ch);
        }
      }
      _ => out.push(ch),
    }
  }

  out
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
