use once_cell::sync::Lazy;
use regex::Regex;

use super::base;
use crate::models::{Activity, RegState, UNKNOWN};

// The calendar is one <tbody>, one <td> per day, one <li> per activity.
static BODY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<tbody[^>]*>.*?</tbody>").expect("agenda body regex"));
static DAY_CELL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<td\s+class="\s*(?:|activite_jour|week-end)\s*"[^>]*>.*?</td>"#)
        .expect("agenda day cell regex")
});
static DAY_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<span(?:\s+[^>]*)?>(.*?)</span>").expect("agenda day label regex"));
static ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<li[^>]*>(.*?)</li>").expect("agenda item regex"));
static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a [^>]*class="([^"]*)"[^>]*href="([^"]*)"[^>]*title="(.*?)"[^>]*>(.*?)</a>"#)
        .expect("agenda link regex")
});
static ATTENDEES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Nb d'inscrits\s*:\s*([^,]*)").expect("agenda attendees regex"));
static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"horaires de l'activité de\s*:\s*([^,]*)").expect("agenda time regex")
});

const PLACE_LABEL: &str = "lieu :";
// End of the place section; the rest of the title metadata is the
// description teaser ("<author> a écrit : …"), entity-encoded in source.
const PLACE_END: &str = " a &eacute;crit :";

const MONTH_NAMES: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

pub fn month_name(month: u32) -> &'static str {
    match month {
        1..=12 => MONTH_NAMES[month as usize - 1],
        _ => UNKNOWN,
    }
}

/// Extract one month's activity summaries from the agenda page. `month` and
/// `year` come from the caller's navigation context and only feed the
/// composed display date; a page without the calendar body, or with no
/// matching day cell, yields an empty list.
pub fn parse_document(html: &str, month: u32, year: i32) -> Vec<Activity> {
    let body = match BODY_RE.find(html) {
        Some(m) => m.as_str(),
        None => return Vec::new(),
    };

    let mut activities = Vec::new();

    for cell in DAY_CELL_RE.find_iter(body) {
        let cell = cell.as_str();

        let full_date = match DAY_LABEL_RE.captures(cell) {
            Some(caps) => {
                let day = base::strip_tags(&caps[1]).trim().to_string();
                format!("{day} {} {year}", month_name(month))
            }
            None => UNKNOWN.to_string(),
        };

        for item in ITEM_RE.captures_iter(cell) {
            // Items without the expected anchor shape are skipped; a partial
            // agenda beats no agenda.
            let link = match LINK_RE.captures(&item[1]) {
                Some(caps) => caps,
                None => continue,
            };
            let class = &link[1];
            let href = &link[2];
            let title_info = &link[3];

            let reg_state = if class.contains("agenda_inscrit_attente") {
                RegState::Waitlisted
            } else if class.contains("agenda_inscrit") {
                RegState::Registered
            } else {
                RegState::NotRegistered
            };

            let act_id = match href.find("id=") {
                Some(idx) => &href[idx + 3..],
                None => UNKNOWN,
            };

            let mut activity = Activity::new(act_id);
            activity.title = base::html_to_plain_text(&link[4]).trim().to_string();
            activity.date = full_date.clone();
            activity.reg_state = reg_state;

            if let Some(caps) = ATTENDEES_RE.captures(title_info) {
                activity.attendees = caps[1].trim().parse().unwrap_or(0);
            }
            if let Some(caps) = TIME_RE.captures(title_info) {
                activity.time = base::html_to_plain_text(caps[1].trim());
            }
            activity.place = place_from_title(title_info);

            activities.push(activity);
        }
    }

    activities
}

fn place_from_title(title_info: &str) -> String {
    let start = match title_info.find(PLACE_LABEL) {
        Some(idx) => idx + PLACE_LABEL.len(),
        None => return UNKNOWN.to_string(),
    };
    let after = &title_info[start..];
    let section = match after.find(PLACE_END) {
        Some(end) => &after[..end],
        None => return UNKNOWN.to_string(),
    };
    // The section ends with the author name; everything past the last comma
    // is theirs, not the venue's.
    let section = match section.rfind(',') {
        Some(idx) => &section[..idx],
        None => section,
    };
    let place = base::html_to_plain_text(section).trim().to_string();
    if place.is_empty() {
        UNKNOWN.to_string()
    } else {
        place
    }
}

/// Group summaries by their display date, preserving first-seen order of the
/// dates (the fragment's document order, not calendar order).
pub fn group_by_date(activities: &[Activity]) -> Vec<(String, Vec<Activity>)> {
    let mut grouped: Vec<(String, Vec<Activity>)> = Vec::new();
    for activity in activities {
        match grouped.iter_mut().find(|(date, _)| *date == activity.date) {
            Some((_, bucket)) => bucket.push(activity.clone()),
            None => grouped.push((activity.date.clone(), vec![activity.clone()])),
        }
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
    <table class="agenda"><tbody>
        <tr>
            <td class="activite_jour">
                <span class="jour"><strong>15</strong></span>
                <ul>
                    <li><a class="agenda_inscrit" href="index.php?action=iAgenda_iactivite&id=123" title="Nb d'inscrits : 7, horaires de l'activité de : 14h-17h, lieu : Salle A, Dupont J. a &eacute;crit : Venez nombreux">Atelier jeux</a></li>
                    <li>Pas de lien ici</li>
                </ul>
            </td>
            <td class="week-end">
                <span class="jour">16</span>
                <ul>
                    <li><a class="agenda_inscrit_attente" href="index.php?action=iAgenda_iactivite&id=456" title="Nb d'inscrits : 12, horaires de l'activité de : 20h, lieu : , Martin a &eacute;crit : Complet">Soir&eacute;e d&eacute;bat</a></li>
                </ul>
            </td>
        </tr>
    </tbody></table>
    "#;

    #[test]
    fn parses_agenda_summaries() {
        let activities = parse_document(SAMPLE_HTML, 3, 2025);
        assert_eq!(activities.len(), 2);

        let first = &activities[0];
        assert_eq!(first.act_id, "123");
        assert_eq!(first.title, "Atelier jeux");
        assert_eq!(first.date, "15 Mars 2025");
        assert_eq!(first.time, "14h-17h");
        assert_eq!(first.place, "Salle A");
        assert_eq!(first.attendees, 7);
        assert_eq!(first.reg_state, RegState::Registered);

        let second = &activities[1];
        assert_eq!(second.act_id, "456");
        assert_eq!(second.title, "Soirée débat");
        assert_eq!(second.date, "16 Mars 2025");
        assert_eq!(second.reg_state, RegState::Waitlisted);
        // Empty place section degrades to the unknown marker.
        assert_eq!(second.place, "?");
    }

    #[test]
    fn empty_calendar_yields_empty_list() {
        let html = r#"<table><tbody><tr></tr></tbody></table>"#;
        assert!(parse_document(html, 6, 2025).is_empty());
    }

    #[test]
    fn missing_calendar_body_yields_empty_list() {
        assert!(parse_document("<html><body><p>Erreur</p></body></html>", 6, 2025).is_empty());
    }

    #[test]
    fn place_without_trailing_comma_is_kept_whole() {
        let title = "Nb d'inscrits : 3, lieu : Parc Montsouris a &eacute;crit : balade";
        assert_eq!(place_from_title(title), "Parc Montsouris");
    }

    #[test]
    fn groups_preserve_first_seen_date_order() {
        let mut a = Activity::new("1");
        a.date = "16 Mars 2025".to_string();
        let mut b = Activity::new("2");
        b.date = "15 Mars 2025".to_string();
        let mut c = Activity::new("3");
        c.date = "16 Mars 2025".to_string();

        let grouped = group_by_date(&[a, b, c]);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, "16 Mars 2025");
        assert_eq!(grouped[0].1.len(), 2);
        assert_eq!(grouped[1].0, "15 Mars 2025");
    }

    #[test]
    fn month_names_resolve_in_french() {
        assert_eq!(month_name(1), "Janvier");
        assert_eq!(month_name(8), "Août");
        assert_eq!(month_name(13), "?");
    }
}
