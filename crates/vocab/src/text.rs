//! Cleanup for text pasted into vocabulary fields

/// Clean text pasted from chat assistants or web pages
///
/// Strips invisible characters, normalizes spaces and line breaks, and
/// collapses runs of blank lines while keeping markdown intact. Input that
/// looks like HTML is only trimmed.
pub fn clean_text_content(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    if looks_like_html(text) {
        return text.trim().to_string();
    }

    let mut cleaned = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\u{200B}'..='\u{200D}' | '\u{FEFF}' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                cleaned.push('\n');
            }
            c if is_stripped_control(c) => {}
            c if is_exotic_space(c) => cleaned.push(' '),
            c => cleaned.push(c),
        }
    }

    let collapsed = collapse_blank_lines(&cleaned);

    collapsed
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Reduce markdown to plain text for list snippets and previews
///
/// Fenced code blocks, images, horizontal rules and HTML tags are dropped.
/// Headers, quotes, list items, links, inline code and emphasis keep their
/// text. The result goes through [`clean_text_content`].
pub fn strip_markdown(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let plain = remove_fenced_blocks(text)
        .split('\n')
        .map(|line| {
            let chars: Vec<char> = strip_block_markers(line).chars().collect();
            strip_inline(&chars)
        })
        .collect::<Vec<_>>()
        .join("\n");

    clean_text_content(&plain)
}

/// Remove every closed ```...``` span; an unclosed fence is left alone
fn remove_fenced_blocks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("```") {
        let after = &rest[start + 3..];
        let Some(end) = after.find("```") else {
            break;
        };
        out.push_str(&rest[..start]);
        rest = &after[end + 3..];
    }
    out.push_str(rest);
    out
}

fn is_rule(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 3 && ['-', '*', '_'].iter().any(|&m| line.chars().all(|c| c == m))
}

/// Strip a leading header, quote or list marker
fn strip_block_markers(line: &str) -> &str {
    if is_rule(line) {
        return "";
    }

    let trimmed = line.trim_start();
    if let Some(text) = header_text(trimmed) {
        return text;
    }

    let mut rest = trimmed;
    while let Some(quoted) = rest.strip_prefix('>') {
        rest = quoted.trim_start();
    }

    match list_item_text(rest) {
        Some(text) => text,
        None if rest.len() != trimmed.len() => rest,
        None => line,
    }
}

fn header_text(line: &str) -> Option<&str> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let rest = &line[hashes..];
    rest.starts_with(char::is_whitespace).then(|| rest.trim_start())
}

fn list_item_text(line: &str) -> Option<&str> {
    let marker_len = match line.bytes().next()? {
        b'*' | b'-' | b'+' => 1,
        b'0'..=b'9' => {
            let digits = line.bytes().take_while(|b| b.is_ascii_digit()).count();
            if !line[digits..].starts_with('.') {
                return None;
            }
            digits + 1
        }
        _ => return None,
    };
    let rest = &line[marker_len..];
    rest.starts_with(char::is_whitespace).then(|| rest.trim_start())
}

/// Strip inline code, emphasis, links, images and tags from one line
fn strip_inline(chars: &[char]) -> String {
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '`' => {
                let n = run_len(chars, i, '`');
                if n == 1
                    && let Some(end) = find_char(chars, i + 1, '`')
                {
                    out.extend(&chars[i + 1..end]);
                    i = end + 1;
                } else {
                    out.extend(&chars[i..i + n]);
                    i += n;
                }
                continue;
            }
            '!' if chars.get(i + 1) == Some(&'[') => {
                if let Some((_, end)) = link_at(chars, i + 1) {
                    i = end;
                    continue;
                }
            }
            '[' => {
                if let Some((text_end, end)) = link_at(chars, i) {
                    out.push_str(&strip_inline(&chars[i + 1..text_end]));
                    i = end;
                    continue;
                }
            }
            '<' if chars.get(i + 1).is_some_and(|c| c.is_ascii_alphabetic() || *c == '/') => {
                if let Some(end) = find_char(chars, i + 1, '>') {
                    i = end + 1;
                    continue;
                }
            }
            c @ ('*' | '_') => {
                let n = run_len(chars, i, c);
                // Underscores inside a word (snake_case) are not emphasis
                let opens = c == '*' || i == 0 || !chars[i - 1].is_alphanumeric();
                if opens
                    && let Some(close) =
                        closing_run(chars, i + n, c, n).filter(|&close| close > i + n)
                {
                    out.push_str(&strip_inline(&chars[i + n..close]));
                    i = close + n;
                } else {
                    out.extend(&chars[i..i + n]);
                    i += n;
                }
                continue;
            }
            _ => {}
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn find_char(chars: &[char], from: usize, target: char) -> Option<usize> {
    chars
        .get(from..)?
        .iter()
        .position(|&c| c == target)
        .map(|pos| from + pos)
}

/// `[text](url)` starting at `open`: the index of `]` and one past `)`
fn link_at(chars: &[char], open: usize) -> Option<(usize, usize)> {
    let text_end = find_char(chars, open + 1, ']')?;
    if chars.get(text_end + 1) != Some(&'(') {
        return None;
    }
    let close = find_char(chars, text_end + 2, ')')?;
    Some((text_end, close + 1))
}

fn run_len(chars: &[char], from: usize, c: char) -> usize {
    chars[from..].iter().take_while(|&&x| x == c).count()
}

/// Next run of exactly `n` copies of `c` that can close emphasis
fn closing_run(chars: &[char], from: usize, c: char, n: usize) -> Option<usize> {
    let mut j = from;
    while j < chars.len() {
        if chars[j] != c {
            j += 1;
            continue;
        }
        let len = run_len(chars, j, c);
        let word_follows = chars.get(j + len).is_some_and(|x| x.is_alphanumeric());
        if len == n && (c == '*' || !word_follows) {
            return Some(j);
        }
        j += len;
    }
    None
}

/// A `<` immediately followed by a letter, closed somewhere later by `>`
fn looks_like_html(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.windows(2).enumerate().any(|(i, pair)| {
        pair[0] == b'<' && pair[1].is_ascii_alphabetic() && bytes[i + 2..].contains(&b'>')
    })
}

/// Control characters other than tab, LF and CR
fn is_stripped_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
}

fn is_exotic_space(c: char) -> bool {
    matches!(
        c,
        '\u{00A0}' | '\u{1680}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}'
    )
}

/// Replace every run of three or more newlines with exactly two
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = 0;
    for c in text.chars() {
        if c == '\n' {
            run += 1;
            if run <= 2 {
                out.push(c);
            }
        } else {
            run = 0;
            out.push(c);
        }
    }
    out
}
