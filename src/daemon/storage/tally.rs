use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

/// The single record dwell keeps on disk: how many active seconds have been
/// accumulated on a given local calendar date. The date is stored as
/// `YYYY-MM-DD` so the file stays readable by hand.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize, Clone, Copy)]
pub struct DailyTally {
    pub date: NaiveDate,
    pub seconds: u64,
}

impl DailyTally {
    pub fn fresh(date: NaiveDate) -> Self {
        Self { date, seconds: 0 }
    }

    /// One tick's worth of progress. A tally from a previous date restarts at
    /// 1 rather than 0 since the tick that notices the rollover is itself one
    /// active second of the new day.
    pub fn advanced(&self, today: NaiveDate) -> Self {
        if self.date == today {
            Self {
                date: today,
                seconds: self.seconds + 1,
            }
        } else {
            Self {
                date: today,
                seconds: 1,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::DailyTally;

    const DAY: NaiveDate = NaiveDate::from_ymd_opt(2018, 7, 4).unwrap();

    #[test]
    fn test_same_date_increments() {
        let tally = DailyTally {
            date: DAY,
            seconds: 41,
        };
        assert_eq!(
            tally.advanced(DAY),
            DailyTally {
                date: DAY,
                seconds: 42
            }
        );
    }

    #[test]
    fn test_seconds_never_decrease_within_a_date() {
        let mut tally = DailyTally::fresh(DAY);
        for _ in 0..100 {
            let next = tally.advanced(DAY);
            assert!(next.seconds > tally.seconds);
            tally = next;
        }
        assert_eq!(tally.seconds, 100);
    }

    #[test]
    fn test_date_rollover_restarts_at_one() {
        let tally = DailyTally {
            date: DAY,
            seconds: 86_000,
        };
        let next_day = DAY.succ_opt().unwrap();
        assert_eq!(
            tally.advanced(next_day),
            DailyTally {
                date: next_day,
                seconds: 1
            }
        );
    }

    #[test]
    fn test_serializes_with_plain_date() {
        let tally = DailyTally {
            date: DAY,
            seconds: 42,
        };
        let json = serde_json::to_string(&tally).unwrap();
        assert_eq!(json, r#"{"date":"2018-07-04","seconds":42}"#);
        assert_eq!(serde_json::from_str::<DailyTally>(&json).unwrap(), tally);
    }
}
