use chrono::{DateTime, FixedOffset, Utc};
use database::{Event, Member};

/// A member's relevant events, split by how they responded
#[derive(Debug, Default)]
pub struct Agenda<'e> {
    pub going: Vec<&'e Event>,
    pub maybe: Vec<&'e Event>,
    pub declined: Vec<&'e Event>,
}

impl<'e> Agenda<'e> {
    /// Sort the events by the member's response, keeping their original order
    ///
    /// An event the member is listed under multiple times appears in each matching category.
    pub fn collect<I>(events: I, user_id: &str) -> Self
    where
        I: IntoIterator<Item = &'e Event>,
    {
        let mut agenda = Agenda::default();

        for event in events {
            if event.is_going(user_id) {
                agenda.going.push(event);
            }
            if event.is_maybe(user_id) {
                agenda.maybe.push(event);
            }
            if event.is_not_going(user_id) {
                agenda.declined.push(event);
            }
        }

        agenda
    }

    /// Whether the member has nothing scheduled
    pub fn is_empty(&self) -> bool {
        self.going.is_empty() && self.maybe.is_empty() && self.declined.is_empty()
    }
}

/// A composed reminder
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message {
    pub subject: String,
    pub body: String,
}

/// Renders reminders for members
#[derive(Clone, Debug)]
pub struct Composer {
    /// The offset dates and times are displayed in
    offset: FixedOffset,
}

impl Composer {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Write the reminder for a member of the named organization
    pub fn compose(
        &self,
        member: &Member,
        agenda: &Agenda<'_>,
        organization: &str,
        now: DateTime<Utc>,
    ) -> Message {
        let today = now.with_timezone(&self.offset);
        let subject = format!("Your events for {}", today.format("%A, %B %-d"));

        let mut body = format!("Hi {},\n\n", member.name);

        if agenda.is_empty() {
            body.push_str("You have no events in the next 24 hours. Enjoy your free day!\n\n");
        } else {
            body.push_str(&format!(
                "Here is what is coming up at {organization} in the next 24 hours.\n\n"
            ));
            self.section(&mut body, "You are attending:", &agenda.going);
            self.section(&mut body, "You might be attending:", &agenda.maybe);
            self.section(&mut body, "You declined:", &agenda.declined);
        }

        body.push_str(&format!("See you soon,\n{organization}"));

        Message { subject, body }
    }

    fn section(&self, body: &mut String, heading: &str, events: &[&Event]) {
        if events.is_empty() {
            return;
        }

        body.push_str(heading);
        body.push('\n');

        for event in events {
            let at = event.scheduled_at.with_timezone(&self.offset);
            body.push_str(&format!(
                "- {} on {} at {}",
                event.name,
                at.format("%A, %B %-d"),
                at.format("%H:%M"),
            ));
            if !event.location.is_empty() {
                body.push_str(&format!(" ({})", event.location));
            }
            body.push('\n');
        }

        body.push('\n');
    }
}

impl Default for Composer {
    fn default() -> Self {
        Composer::new(FixedOffset::east_opt(0).expect("zero offset is valid"))
    }
}

#[cfg(test)]
mod tests {
    use super::{Agenda, Composer};
    use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
    use database::{Event, Member, Role};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    fn member() -> Member {
        Member {
            user_id: String::from("U1"),
            team: String::from("T1"),
            name: String::from("Ada"),
            email: String::from("ada@example.com"),
            image: String::new(),
            role: Role::User,
            created_at: now(),
        }
    }

    fn event(name: &str, going: &str, maybe: &str, not_going: &str) -> Event {
        Event {
            id: 1,
            team: String::from("T1"),
            name: name.to_owned(),
            comments: String::new(),
            scheduled_at: now() + Duration::hours(4),
            location: String::from("Main hall"),
            status_going: going.to_owned(),
            status_maybe: maybe.to_owned(),
            status_not_going: not_going.to_owned(),
        }
    }

    fn bullets(body: &str) -> usize {
        body.lines().filter(|line| line.starts_with("- ")).count()
    }

    #[test]
    fn single_going_event() {
        let events = [event("Hack night", "U1", "", "")];
        let agenda = Agenda::collect(&events, "U1");

        let message = Composer::default().compose(&member(), &agenda, "Hack Club", now());

        assert_eq!(bullets(&message.body), 1);
        assert!(message.body.contains("You are attending:"));
        assert!(message
            .body
            .contains("- Hack night on Saturday, June 1 at 13:00 (Main hall)"));
        assert!(!message.body.contains("You might be attending:"));
        assert!(!message.body.contains("You declined:"));
        assert!(!message.body.contains("free day"));
    }

    #[test]
    fn free_day_when_nothing_is_scheduled() {
        let events = [event("Hack night", "U2", "U3", "")];
        let agenda = Agenda::collect(&events, "U1");

        let message = Composer::default().compose(&member(), &agenda, "Hack Club", now());

        assert_eq!(bullets(&message.body), 0);
        assert_eq!(
            message.body,
            "Hi Ada,\n\nYou have no events in the next 24 hours. Enjoy your free day!\n\nSee you soon,\nHack Club"
        );
    }

    #[test]
    fn every_category_gets_its_own_section() {
        let events = [
            event("Standup", "U1", "", ""),
            event("Lunch", "", "U1", ""),
            event("Retro", "", "", "U1"),
        ];
        let agenda = Agenda::collect(&events, "U1");

        let message = Composer::default().compose(&member(), &agenda, "Hack Club", now());

        let attending = message.body.find("You are attending:").unwrap();
        let maybe = message.body.find("You might be attending:").unwrap();
        let declined = message.body.find("You declined:").unwrap();
        assert!(attending < maybe && maybe < declined);
        assert_eq!(bullets(&message.body), 3);
        assert!(message.body.ends_with("See you soon,\nHack Club"));
    }

    #[test]
    fn body_layout() {
        let mut unplaced = event("Lunch", "", "U1", "");
        unplaced.location.clear();
        let events = [event("Hack night", "U1", "", ""), unplaced];
        let agenda = Agenda::collect(&events, "U1");

        let message = Composer::default().compose(&member(), &agenda, "Hack Club", now());

        assert_eq!(message.subject, "Your events for Saturday, June 1");
        assert_eq!(
            message.body,
            "Hi Ada,\n\n\
             Here is what is coming up at Hack Club in the next 24 hours.\n\n\
             You are attending:\n\
             - Hack night on Saturday, June 1 at 13:00 (Main hall)\n\n\
             You might be attending:\n\
             - Lunch on Saturday, June 1 at 13:00\n\n\
             See you soon,\nHack Club"
        );
    }

    #[test]
    fn overlapping_statuses_appear_in_each_category() {
        let events = [event("Standup", "U1", "U1", "")];
        let agenda = Agenda::collect(&events, "U1");

        assert_eq!(agenda.going.len(), 1);
        assert_eq!(agenda.maybe.len(), 1);
        assert!(agenda.declined.is_empty());
    }

    #[test]
    fn times_use_the_display_offset() {
        let events = [event("Standup", "U1", "", "")];
        let agenda = Agenda::collect(&events, "U1");
        let offset = FixedOffset::west_opt(14 * 3600).unwrap();

        let message = Composer::new(offset).compose(&member(), &agenda, "Hack Club", now());

        // 13:00 UTC is 23:00 the previous day at UTC-14
        assert_eq!(message.subject, "Your events for Friday, May 31");
        assert!(message.body.contains("Standup on Friday, May 31 at 23:00"));
    }

    #[test]
    fn inputs_are_left_untouched() {
        let events = [event("Standup", "U1", "", "")];
        let before = events.clone();
        let member = member();

        let agenda = Agenda::collect(&events, "U1");
        let _ = Composer::default().compose(&member, &agenda, "Hack Club", now());

        assert_eq!(events, before);
        assert_eq!(member, self::member());
    }
}
