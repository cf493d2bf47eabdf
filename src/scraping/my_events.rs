use once_cell::sync::Lazy;
use regex::Regex;

use super::base;
use crate::models::Activity;

// One row per registered/waitlisted event: a link to the activity and a
// date cell. The exact state is only known after a detail fetch.
static ROW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<tr>.*?<a [^>]*href="([^"]*)"[^>]*>(.*?)</a>.*?<td>(.*?)</td>.*?</tr>"#)
        .expect("my-events row regex")
});

/// Extract lightweight summaries from the "my events" table. An empty or
/// unrecognized table is an empty list, which the caller renders as
/// "no events found".
pub fn parse_document(html: &str) -> Vec<Activity> {
    let mut events = Vec::new();

    for row in ROW_RE.captures_iter(html) {
        let href = &row[1];
        let act_id = match href.find("id=") {
            Some(idx) => &href[idx + 3..],
            None => "",
        };

        let mut activity = Activity::new(act_id);
        activity.title = base::html_to_plain_text(&row[2]).trim().to_string();
        activity.date = base::html_to_plain_text(&row[3]).trim().to_string();
        events.push(activity);
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
    <table class="evenements">
        <tr>
            <th><a href="index.php?action=iAgenda_iactivite&id=123">Soir&eacute;e jeux</a></th>
            <td>15 Mars 2025</td>
        </tr>
        <tr>
            <th><a href="index.php?action=iAgenda_iactivite&id=456">Randonn&eacute;e</a></th>
            <td>22 Mars 2025</td>
        </tr>
    </table>
    "#;

    #[test]
    fn parses_event_rows() {
        let events = parse_document(SAMPLE_HTML);
        assert_eq!(events.len(), 2);

        assert_eq!(events[0].act_id, "123");
        assert_eq!(events[0].title, "Soirée jeux");
        assert_eq!(events[0].date, "15 Mars 2025");

        assert_eq!(events[1].act_id, "456");
        assert_eq!(events[1].title, "Randonnée");
    }

    #[test]
    fn empty_table_yields_empty_list() {
        assert!(parse_document("<table></table>").is_empty());
        assert!(parse_document("").is_empty());
    }
}
