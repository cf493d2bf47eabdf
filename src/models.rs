use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

pub const UNKNOWN: &str = "?";
pub const NO_DESCRIPTION: &str = "Pas de description.";
pub const UNLIMITED: i32 = -1; // max_attendees sentinel: no attendance cap

static NEXT_LOCAL_ID: AtomicU64 = AtomicU64::new(1);

/// The current member's status relative to one activity, encoded the way
/// the site encodes it in its hidden `d` form field.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(into = "i32", from = "i32")]
pub enum RegState {
    NotRegistered,
    Registered,
    WaitlistOpen, // activity full, member may join the waiting list
    Waitlisted,
    Closed,
}

impl RegState {
    /// The numeric code used in the site's registration form.
    pub fn code(self) -> i32 {
        match self {
            RegState::NotRegistered => 0,
            RegState::Registered => 1,
            RegState::WaitlistOpen => 10,
            RegState::Waitlisted => 11,
            RegState::Closed => -1,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            1 => RegState::Registered,
            10 => RegState::WaitlistOpen,
            11 => RegState::Waitlisted,
            -1 => RegState::Closed,
            _ => RegState::NotRegistered,
        }
    }
}

impl From<RegState> for i32 {
    fn from(state: RegState) -> i32 {
        state.code()
    }
}

impl From<i32> for RegState {
    fn from(code: i32) -> RegState {
        RegState::from_code(code)
    }
}

/// One agenda entry. Summary records (agenda and my-events listings) leave
/// the detail-only fields at their defaults; the detail extractor produces
/// a fully populated record that replaces the summary wholesale.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Activity {
    pub id: u64, // local identity, fresh per extraction, not stable across re-fetches
    pub act_id: String, // the site's identifier, used to re-fetch the detail page
    pub title: String,
    pub place: String,
    pub date: String,
    pub time: String,
    pub author: String,
    pub cost: String,
    pub attendees: u32,
    pub max_attendees: i32, // -1 = unlimited
    pub guests: u32,
    pub max_guests: u32, // 0 = guests not allowed
    pub guest_list: Vec<String>,
    pub description: String, // raw HTML fragment, rendered as rich text downstream
    pub reg_state: RegState,
}

impl Activity {
    pub fn new(act_id: impl Into<String>) -> Self {
        Activity {
            id: NEXT_LOCAL_ID.fetch_add(1, Ordering::Relaxed),
            act_id: act_id.into(),
            title: UNKNOWN.to_string(),
            place: UNKNOWN.to_string(),
            date: UNKNOWN.to_string(),
            time: UNKNOWN.to_string(),
            author: UNKNOWN.to_string(),
            cost: UNKNOWN.to_string(),
            attendees: 0,
            max_attendees: UNLIMITED,
            guests: 0,
            max_guests: 0,
            guest_list: Vec::new(),
            description: NO_DESCRIPTION.to_string(),
            reg_state: RegState::NotRegistered,
        }
    }

    /// Always false for unlimited activities.
    pub fn is_full(&self) -> bool {
        self.max_attendees != UNLIMITED && self.attendees as i32 >= self.max_attendees
    }

    /// Guests can only be added by a registered member, on activities that
    /// allow guests, below the per-member cap.
    pub fn can_add_guest(&self) -> bool {
        self.reg_state == RegState::Registered
            && self.max_guests > 0
            && self.guests < self.max_guests
    }
}

impl PartialEq for Activity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reg_state_codes_round_trip() {
        for state in [
            RegState::NotRegistered,
            RegState::Registered,
            RegState::WaitlistOpen,
            RegState::Waitlisted,
            RegState::Closed,
        ] {
            assert_eq!(RegState::from_code(state.code()), state);
        }
        // Unknown codes degrade to the neutral state.
        assert_eq!(RegState::from_code(42), RegState::NotRegistered);
    }

    #[test]
    fn local_ids_are_unique_per_extraction() {
        let a = Activity::new("123");
        let b = Activity::new("123");
        assert_ne!(a.id, b.id);
        assert_ne!(a, b);
    }

    #[test]
    fn unlimited_capacity_is_never_full() {
        let mut activity = Activity::new("1");
        activity.attendees = 500;
        assert_eq!(activity.max_attendees, UNLIMITED);
        assert!(!activity.is_full());

        activity.max_attendees = 10;
        assert!(activity.is_full());
    }

    #[test]
    fn guest_eligibility_requires_registration_and_room() {
        let mut activity = Activity::new("1");
        activity.max_guests = 2;
        assert!(!activity.can_add_guest(), "not registered yet");

        activity.reg_state = RegState::Registered;
        assert!(activity.can_add_guest());

        activity.guests = 2;
        assert!(!activity.can_add_guest(), "per-member cap reached");

        activity.guests = 0;
        activity.max_guests = 0;
        assert!(!activity.can_add_guest(), "guests disallowed");
    }
}
