//! HTML 处理：转义与白名单清洗

/// 转义 HTML 特殊字符
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// 用户输入的基础 XSS 防护
pub fn sanitize_input(text: &str) -> String {
    escape_html(text)
}

/// 白名单 HTML 清洗
///
/// 只保留 `allowed_tags` 中的标签和 `allowed_attributes` 中的属性。
/// 其余标签被删除但保留其中的文本，注释被整体删除，
/// 不构成标签的 `<` `>` 以及不构成实体的 `&` 转义输出。
pub fn sanitize_html(input: &str, allowed_tags: &[&str], allowed_attributes: &[&str]) -> String {
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < len {
        match chars[i] {
            '<' => {
                // 注释
                if chars[i..].starts_with(&['<', '!', '-', '-']) {
                    i = match find_sequence(&chars, i + 4, &['-', '-', '>']) {
                        Some(end) => end + 3,
                        None => len,
                    };
                    continue;
                }

                if !starts_tag(&chars, i) {
                    out.push_str("&lt;");
                    i += 1;
                    continue;
                }

                // 找到与之匹配的 '>'，引号内的 '>' 不算
                let Some(end) = find_tag_end(&chars, i + 1) else {
                    // 未闭合的标签直到结尾都丢弃
                    break;
                };
                let raw: String = chars[i + 1..end].iter().collect();
                if let Some(tag) = render_tag(&raw, allowed_tags, allowed_attributes) {
                    out.push_str(&tag);
                }
                i = end + 1;
            }
            '>' => {
                out.push_str("&gt;");
                i += 1;
            }
            '&' => {
                if entity_len(&chars[i..]).is_some() {
                    out.push('&');
                } else {
                    out.push_str("&amp;");
                }
                i += 1;
            }
            ch => {
                out.push(ch);
                i += 1;
            }
        }
    }

    out
}

/// `&name;`、`&#123;`、`&#x1f;` 形式的字符实体长度
fn entity_len(chars: &[char]) -> Option<usize> {
    let body_start = match chars.get(1) {
        Some('#') if matches!(chars.get(2), Some('x') | Some('X')) => 3,
        Some('#') => 2,
        Some(_) => 1,
        None => return None,
    };
    let numeric = body_start > 1;
    let hex = body_start == 3;
    let body = chars[body_start..]
        .iter()
        .take_while(|c| match (numeric, hex) {
            (true, true) => c.is_ascii_hexdigit(),
            (true, false) => c.is_ascii_digit(),
            _ => c.is_ascii_alphanumeric(),
        })
        .count();
    if body == 0 || chars.get(body_start + body) != Some(&';') {
        return None;
    }
    Some(body_start + body + 1)
}

fn starts_tag(chars: &[char], at: usize) -> bool {
    match chars.get(at + 1) {
        Some(c) if c.is_ascii_alphabetic() => true,
        Some('/') => chars.get(at + 2).is_some_and(|c| c.is_ascii_alphabetic()),
        Some('!') | Some('?') => true,
        _ => false,
    }
}

fn find_sequence(chars: &[char], from: usize, needle: &[char]) -> Option<usize> {
    (from..chars.len()).find(|&i| chars[i..].starts_with(needle))
}

fn find_tag_end(chars: &[char], from: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (offset, &c) in chars[from..].iter().enumerate() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '>') => return Some(from + offset),
            (None, _) => {}
        }
    }
    None
}

/// 渲染一个标签；不在白名单中的返回 None
fn render_tag(raw: &str, allowed_tags: &[&str], allowed_attributes: &[&str]) -> Option<String> {
    // <!doctype>、<?xml?> 之类一律丢弃
    if raw.starts_with('!') || raw.starts_with('?') {
        return None;
    }

    let (closing, body) = match raw.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let name_len = body
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(body.len());
    let name = body[..name_len].to_ascii_lowercase();
    if !allowed_tags.contains(&name.as_str()) {
        return None;
    }

    if closing {
        return Some(format!("</{}>", name));
    }

    let mut tag = format!("<{}", name);
    for (attr, value) in parse_attributes(&body[name_len..]) {
        if allowed_attributes.contains(&attr.as_str()) {
            tag.push_str(&format!(" {}=\"{}\"", attr, escape_html(&value)));
        }
    }
    tag.push('>');
    Some(tag)
}

/// 解析属性列表，支持双引号、单引号、无引号和无值四种写法
fn parse_attributes(input: &str) -> Vec<(String, String)> {
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut attrs = Vec::new();
    let mut i = 0;

    while i < len {
        while i < len && (chars[i].is_whitespace() || chars[i] == '/') {
            i += 1;
        }
        let start = i;
        while i < len && !chars[i].is_whitespace() && chars[i] != '=' && chars[i] != '/' {
            i += 1;
        }
        if start == i {
            break;
        }
        let name: String = chars[start..i].iter().collect::<String>().to_ascii_lowercase();

        while i < len && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= len || chars[i] != '=' {
            attrs.push((name, String::new()));
            continue;
        }
        i += 1;
        while i < len && chars[i].is_whitespace() {
            i += 1;
        }

        let value: String = match chars.get(i) {
            Some(&q) if q == '"' || q == '\'' => {
                let value_start = i + 1;
                let value_end = (value_start..len).find(|&j| chars[j] == q).unwrap_or(len);
                i = (value_end + 1).min(len);
                chars[value_start..value_end].iter().collect()
            }
            _ => {
                let value_start = i;
                while i < len && !chars[i].is_whitespace() {
                    i += 1;
                }
                chars[value_start..i].iter().collect()
            }
        };
        attrs.push((name, value));
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAGS: &[&str] = &["p", "br", "strong", "em", "u", "code", "pre"];
    const ATTRS: &[&str] = &["class"];

    fn clean(input: &str) -> String {
        sanitize_html(input, TAGS, ATTRS)
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(
            sanitize_input("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#x27;x&#x27;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn plain_text_is_untouched() {
        let text = "See you at 5pm, bring notes and snacks!";
        assert_eq!(clean(text), text);
    }

    #[test]
    fn bare_ampersands_are_escaped() {
        assert_eq!(clean("AT&T"), "AT&amp;T");
        assert_eq!(clean("notes & snacks"), "notes &amp; snacks");
        assert_eq!(clean("a &amp; b &#39; &#x27; &lt;"), "a &amp; b &#39; &#x27; &lt;");
        assert_eq!(clean("&#xZZ; &; &"), "&amp;#xZZ; &amp;; &amp;");
    }

    #[test]
    fn keeps_allowed_tags() {
        assert_eq!(
            clean("<p>Hello <strong>world</strong><br/></p>"),
            "<p>Hello <strong>world</strong><br></p>"
        );
        assert_eq!(clean("<PRE><Code>x</Code></PRE>"), "<pre><code>x</code></pre>");
    }

    #[test]
    fn strips_disallowed_tags_but_keeps_text() {
        assert_eq!(clean("<script>alert(1)</script>"), "alert(1)");
        assert_eq!(clean("<a href=\"http://x\">link</a> <b>bold</b>"), "link bold");
        assert_eq!(clean("<div><p>in</p></div>"), "<p>in</p>");
    }

    #[test]
    fn filters_attributes() {
        assert_eq!(
            clean("<p class=\"note\" onclick=\"evil()\" style='x'>t</p>"),
            "<p class=\"note\">t</p>"
        );
        assert_eq!(clean("<code class=rust>x</code>"), "<code class=\"rust\">x</code>");
        assert_eq!(clean("<em class='a\"b'>x</em>"), "<em class=\"a&quot;b\">x</em>");
    }

    #[test]
    fn handles_quotes_comments_and_stray_brackets() {
        assert_eq!(clean("<p title=\"a>b\">x</p>"), "<p>x</p>");
        assert_eq!(clean("a<!-- hidden -->b"), "ab");
        assert_eq!(clean("3 < 5 > 4"), "3 &lt; 5 &gt; 4");
        assert_eq!(clean("<!doctype html>text"), "text");
        assert_eq!(clean("unclosed <img src=x"), "unclosed ");
    }
}
