use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabStamp {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub weekday_label: String,
}

// Single source of the lab's day boundary. The ledger and the occupancy view both
// derive "today" through this type so they can never disagree.
#[derive(Clone, Copy, Debug)]
pub struct LabCalendar {
    tz: Tz,
}

impl LabCalendar {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn local(&self, now: DateTime<Utc>) -> DateTime<Tz> {
        now.with_timezone(&self.tz)
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.local(now).date_naive()
    }

    pub fn time_of_day(&self, now: DateTime<Utc>) -> NaiveTime {
        self.local(now).time()
    }

    // Date, time and weekday label of one instant, as written to a ledger row.
    pub fn stamp(&self, now: DateTime<Utc>) -> LabStamp {
        let date = self.today(now);
        LabStamp {
            date,
            time: self.time_of_day(now),
            weekday_label: Self::weekday_label(date).to_string(),
        }
    }

    pub fn weekday_label(date: NaiveDate) -> &'static str {
        match date.weekday() {
            Weekday::Mon => "lunes",
            Weekday::Tue => "martes",
            Weekday::Wed => "miércoles",
            Weekday::Thu => "jueves",
            Weekday::Fri => "viernes",
            Weekday::Sat => "sábado",
            Weekday::Sun => "domingo",
        }
    }
}
