use once_cell::sync::Lazy;
use regex::Regex;

use super::base;
use crate::error::ScrapeError;
use crate::models::{Activity, RegState};

static DL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<dl[^>]*>.*?</dl>").expect("detail dl regex"));
static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h2[^>]*>(.*?)</h2>").expect("detail title regex"));
static INFO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<strong>(.*?)</strong>").expect("detail info regex"));
static AUTHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Activit&eacute;\s*propos&eacute;e\s*par\s*<a[^>]*>([^<]+)</a>")
        .expect("detail author regex")
});
static COST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Co&ucirc;t\s+estim&eacute;\s+de\s+l'activit&eacute;\s*:\s*([^<]+)")
        .expect("detail cost regex")
});
static DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<dt[^>]*>(?:Détails|D&eacute;tails)</dt>.*?<dd[^>]*>(.*?)</dd>")
        .expect("detail description regex")
});
static ATTENDEES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Nombre\s*d['’]inscrits\s*:\s*([0-9]+)").expect("detail attendees regex")
});
static CAPACITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Nombre\s+de\s+personnes\s*(illimit(?:é|&eacute;)e?|maximum\s*:\s*([0-9]+))")
        .expect("detail capacity regex")
});
static GUEST_CAP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([0-9]+)\s*invit&eacute;\(s\)\s*maximum\s*par\s*membre")
        .expect("detail guest cap regex")
});

const GUEST_LIST_LEAD: &str = "<p>Vous venez avec&nbsp;: ";
const GUEST_LIST_END: &str = "</p>";
const GUEST_CANCEL_LABEL: &str = "(d&eacute;sinscription invit&eacute;)";

// Closed-registration phrasing appears either decoded or entity-encoded
// depending on how the page was produced.
const CLOSED_PLAIN: &str = "Les inscriptions à cette activité sont closes";
const CLOSED_ENCODED: &str = "Les inscriptions &agrave; cette activit&eacute; sont closes.";

const MARKER_REGISTERED: &str = r#"name="d" value="1""#;
const MARKER_WAITLIST_OPEN: &str = r#"name="d" value="10""#;
const MARKER_WAITLISTED: &str = r#"name="d" value="11""#;

/// Read the registration state out of any fragment carrying the site's
/// registration form: the detail page, or the response to a submitted
/// registration action. The closed-registration phrase wins over the hidden
/// `d` field, which a closed page may still carry stale.
pub fn registration_state(html: &str) -> RegState {
    if html.contains(CLOSED_PLAIN) || html.contains(CLOSED_ENCODED) {
        RegState::Closed
    } else if html.contains(MARKER_REGISTERED) {
        RegState::Registered
    } else if html.contains(MARKER_WAITLIST_OPEN) {
        RegState::WaitlistOpen
    } else if html.contains(MARKER_WAITLISTED) {
        RegState::Waitlisted
    } else {
        RegState::NotRegistered
    }
}

/// Extract one fully populated record from an activity's page. The only
/// fatal condition is a page without the main `<dl>` block; every field
/// extraction below is independent and degrades to its default.
pub fn parse_document(html: &str, act_id: &str) -> Result<Activity, ScrapeError> {
    let block = DL_RE
        .find(html)
        .map(|m| m.as_str())
        .ok_or(ScrapeError::DetailBlockMissing)?;

    let mut activity = Activity::new(act_id);

    if let Some(caps) = TITLE_RE.captures(html) {
        activity.title = base::html_to_plain_text(&caps[1]).trim().to_string();
    }

    if let Some((place, date)) = place_and_date(block) {
        activity.place = place;
        activity.date = date;
    }

    if let Some(caps) = AUTHOR_RE.captures(block) {
        activity.author = base::html_to_plain_text(&caps[1]).trim().to_string();
    }

    if let Some(caps) = COST_RE.captures(block) {
        activity.cost = base::html_to_plain_text(caps[1].trim());
    }

    if let Some(caps) = DESCRIPTION_RE.captures(block) {
        // Kept as raw markup; rendered as rich text downstream.
        activity.description = caps[1].trim().to_string();
    }

    if let Some(caps) = ATTENDEES_RE.captures(block) {
        activity.attendees = caps[1].parse().unwrap_or(0);
    }

    if let Some(caps) = CAPACITY_RE.captures(block) {
        if caps.get(2).is_none() {
            // The "illimité" branch matched.
            activity.max_attendees = -1;
        } else {
            activity.max_attendees = caps[2].parse().unwrap_or(-1);
        }
    }

    if let Some(caps) = GUEST_CAP_RE.captures(block) {
        activity.max_guests = caps[1].parse().unwrap_or(0);
    }

    activity.guest_list = guest_list(block);
    activity.guests = activity.guest_list.len() as u32;

    activity.reg_state = registration_state(html);

    Ok(activity)
}

/// Positional convention of the source template: the first bolded info line
/// decodes to at least three lines, the second being the place and the third
/// the date. Fewer lines leave both fields at their defaults, as the site's
/// markup has always provided all three when the line is present at all.
fn place_and_date(block: &str) -> Option<(String, String)> {
    let caps = INFO_RE.captures(block)?;
    let plain = base::html_to_plain_text(&caps[1]);
    let parts: Vec<&str> = plain
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if parts.len() >= 3 {
        Some((parts[1].to_string(), parts[2].to_string()))
    } else {
        None
    }
}

fn guest_list(block: &str) -> Vec<String> {
    let start = match block.find(GUEST_LIST_LEAD) {
        Some(idx) => idx + GUEST_LIST_LEAD.len(),
        None => return Vec::new(),
    };
    let rest = &block[start..];
    let content = match rest.find(GUEST_LIST_END) {
        Some(end) => &rest[..end],
        None => return Vec::new(),
    };

    let cleaned = base::strip_tags(content)
        .replace(GUEST_CANCEL_LABEL, "")
        .trim()
        .to_string();
    if cleaned.is_empty() {
        return Vec::new();
    }

    cleaned
        .split(" - ")
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}
