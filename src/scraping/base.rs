use once_cell::sync::Lazy;
use regex::Regex;

// Entity set actually observed in the site's templates. `&amp;` is decoded
// last so a literal `&amp;eacute;` does not turn into an accent.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("&quot;", "\""),
    ("&nbsp;", " "),
    ("&eacute;", "é"),
    ("&egrave;", "è"),
    ("&ecirc;", "ê"),
    ("&euml;", "ë"),
    ("&agrave;", "à"),
    ("&acirc;", "â"),
    ("&ugrave;", "ù"),
    ("&ucirc;", "û"),
    ("&ocirc;", "ô"),
    ("&icirc;", "î"),
    ("&iuml;", "ï"),
    ("&ccedil;", "ç"),
    ("&oelig;", "œ"),
    ("&rsquo;", "’"),
    ("&euro;", "€"),
    ("&amp;", "&"),
];

static ANCHOR_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<a [^>]+>").expect("anchor open regex"));
static ANCHOR_CLOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</a>").expect("anchor close regex"));
static IMG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<img[^>]+>").expect("img regex"));
static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("br regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));
static DEC_ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#([0-9]{1,7});").expect("decimal entity regex"));
static HEX_ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#[xX]([0-9a-fA-F]{1,6});").expect("hex entity regex"));

pub fn clean_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

pub fn strip_tags(input: &str) -> String {
    TAG_RE.replace_all(input, "").into_owned()
}

/// Markup fragment to plain text: anchors and images vanish (anchor inner
/// text is kept), `<br>` becomes a newline, remaining tags are dropped, the
/// observed entity set is decoded. Never fails; whatever cannot be decoded
/// is left as-is. Idempotent on already-plain text.
pub fn html_to_plain_text(html: &str) -> String {
    let text = ANCHOR_OPEN_RE.replace_all(html, "");
    let text = ANCHOR_CLOSE_RE.replace_all(&text, "");
    let text = IMG_RE.replace_all(&text, "");
    let text = BR_RE.replace_all(&text, "\n");
    let text = TAG_RE.replace_all(&text, "");
    let text = decode_numeric_entities(&text);
    decode_named_entities(&text)
}

fn decode_named_entities(text: &str) -> String {
    let mut decoded = text.to_string();
    for (entity, replacement) in NAMED_ENTITIES {
        if decoded.contains(entity) {
            decoded = decoded.replace(entity, replacement);
        }
    }
    decoded
}

fn decode_numeric_entities(text: &str) -> String {
    let text = DEC_ENTITY_RE.replace_all(text, |caps: &regex::Captures<'_>| {
        match caps[1].parse::<u32>().ok().and_then(char::from_u32) {
            Some(ch) => ch.to_string(),
            // Out-of-range code point: keep the raw entity.
            None => caps[0].to_string(),
        }
    });
    HEX_ENTITY_RE
        .replace_all(&text, |caps: &regex::Captures<'_>| {
            match u32::from_str_radix(&caps[1], 16).ok().and_then(char::from_u32) {
                Some(ch) => ch.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
