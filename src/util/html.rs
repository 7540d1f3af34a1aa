/// Tags whose entire content is noise for similarity purposes: scripts,
/// styles, page chrome, and Wikipedia tables/reference markup.
const NOISE_BLOCKS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "table",
];

/// Reduce an HTML document to the plain text a similarity check should see.
///
/// Drops noise blocks wholesale, strips remaining tags, decodes the common
/// entities, and collapses whitespace. Deliberately tolerant of malformed
/// markup: an unclosed noise block is dropped to the end of the input.
pub fn strip_html(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let mut buf = input.to_string();
    for tag in NOISE_BLOCKS {
        drop_blocks(&mut buf, tag);
    }

    let text = strip_tags(&buf);
    let decoded = decode_entities(&text);
    collapse_whitespace(&decoded)
}

/// Remove every `<tag ...>...</tag>` block, case-insensitively.
fn drop_blocks(buf: &mut String, tag: &str) {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    // scan the buffer itself: indices from a lowercased copy can be shifted
    // when lowercasing changes a char's UTF-8 length (e.g. U+0130)
    let mut from = 0;
    while let Some(start) = find_ascii_ci(buf, &open, from) {
        match find_ascii_ci(buf, &close, start + open.len()) {
            Some(close_at) => {
                buf.replace_range(start..close_at + close.len(), " ");
                from = start;
            }
            None => {
                buf.replace_range(start.., "");
                break;
            }
        }
    }
}

/// Byte index of the first ASCII-case-insensitive match of `pattern` in
/// `haystack` at or after `from`. `pattern` must be ASCII, so a match can
/// only start and end on char boundaries.
fn find_ascii_ci(haystack: &str, pattern: &str, from: usize) -> Option<usize> {
    let pat = pattern.as_bytes();
    haystack
        .as_bytes()
        .get(from..)?
        .windows(pat.len())
        .position(|window| window.eq_ignore_ascii_case(pat))
        .map(|pos| pos + from)
}

fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                if in_tag {
                    // a tag often separates words in the rendered text
                    out.push(' ');
                }
                in_tag = false;
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

fn decode_entities(input: &str) -> String {
    input
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        } else {
            out.push(ch);
            last_space = false;
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_collapses_whitespace() {
        let html = "<p>Hello <b>brave</b>\n  new</p> <i>world</i>";
        assert_eq!(strip_html(html), "Hello brave new world");
    }

    #[test]
    fn drops_noise_blocks_entirely() {
        let html = "<div>keep</div><script>var x = 'drop';</script>\
                    <STYLE>body { color: red }</STYLE><table><tr><td>cells</td></tr></table>me";
        assert_eq!(strip_html(html), "keep me");
    }

    #[test]
    fn unclosed_noise_block_is_dropped_to_the_end() {
        let html = "before<script>never closed";
        assert_eq!(strip_html(html), "before");
    }

    #[test]
    fn multibyte_chars_before_noise_blocks() {
        // U+0130 lowercases to two chars (3 bytes from 2); block offsets
        // must still land on the real tag
        assert_eq!(strip_html("İ<script>x</script>é rest"), "İ é rest");
        assert_eq!(
            strip_html("İstanbul <SCRIPT>var x;</SCRIPT> gezisi"),
            "İstanbul gezisi"
        );
    }

    #[test]
    fn decodes_common_entities() {
        let html = "<p>fish&nbsp;&amp;&nbsp;chips &lt;today&gt;</p>";
        assert_eq!(strip_html(html), "fish & chips <today>");
    }

    #[test]
    fn empty_input() {
        assert_eq!(strip_html(""), "");
    }
}
