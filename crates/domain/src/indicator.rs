use crate::{
    day::Day,
    dose_instance::{DoseInstance, IntakeStatus},
    medicine::Medicine,
    schedule::DoseSchedule,
    shared::entity::ID,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One calendar dot: the per day summary for a single medicine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayDot {
    pub medicine_id: ID,
    pub label: String,
    pub status: IntakeStatus,
}

/// Folds the distinct statuses a medicine observed on one date into a
/// single display status. One bad outcome taints the whole day, while
/// an all good day requires every dose to be taken.
pub fn summarize_statuses(statuses: &[IntakeStatus]) -> Option<IntakeStatus> {
    if statuses.is_empty() {
        return None;
    }
    let summary = if statuses.contains(&IntakeStatus::Missed) {
        IntakeStatus::Missed
    } else if statuses.contains(&IntakeStatus::Skipped) {
        IntakeStatus::Skipped
    } else if statuses.contains(&IntakeStatus::Scheduled) {
        IntakeStatus::Scheduled
    } else {
        IntakeStatus::Taken
    };
    Some(summary)
}

/// Builds the calendar indicators for a batch of dose instances.
///
/// Instances belonging to a soft deleted medicine or schedule are
/// filtered out, as are stale scheduled rows from dates that have fully
/// elapsed. Scheduled rows past their grace deadline read as missed.
/// Dots per date are ordered by severity descending, ties broken by
/// case folded label.
pub fn build_day_indicators(
    instances: &[DoseInstance],
    schedules: &HashMap<ID, DoseSchedule>,
    medicines: &HashMap<ID, Medicine>,
    now: i64,
) -> BTreeMap<Day, Vec<DayDot>> {
    let statuses_by_date_and_medicine = instances
        .iter()
        .filter(|instance| !instance.is_deleted())
        .filter_map(|instance| {
            let schedule = schedules.get(&instance.schedule_id)?;
            let medicine = medicines.get(&instance.medicine_id)?;
            if schedule.is_deleted() || medicine.is_deleted() {
                return None;
            }

            let tz = &schedule.recurrence.timezone;
            let today = Day::from_timestamp(now, tz);
            if instance.date < today && instance.status == IntakeStatus::Scheduled {
                // A stale row the missed promotion never reached, not
                // meaningful as "scheduled" anymore
                return None;
            }

            let status = instance.status_at(now, tz);
            Some(((instance.date, instance.medicine_id.clone()), status))
        })
        .into_group_map();

    let mut indicators: BTreeMap<Day, Vec<DayDot>> = BTreeMap::new();
    for ((date, medicine_id), statuses) in statuses_by_date_and_medicine {
        let Some(status) = summarize_statuses(&statuses) else {
            continue;
        };
        let label = medicines
            .get(&medicine_id)
            .map(|m| m.label())
            .unwrap_or_else(|| "?".into());
        indicators.entry(date).or_default().push(DayDot {
            medicine_id,
            label,
            status,
        });
    }

    for dots in indicators.values_mut() {
        dots.sort_by(|a, b| {
            b.status
                .severity()
                .cmp(&a.status.severity())
                .then_with(|| a.label.to_lowercase().cmp(&b.label.to_lowercase()))
        });
    }

    indicators
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        recurrence::{RecurrencePattern, RecurrenceRule},
        schedule::TimeOfDay,
    };
    use chrono_tz::UTC;

    struct Fixture {
        medicines: HashMap<ID, Medicine>,
        schedules: HashMap<ID, DoseSchedule>,
        instances: Vec<DoseInstance>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                medicines: HashMap::new(),
                schedules: HashMap::new(),
                instances: Vec::new(),
            }
        }

        fn add_medicine(&mut self, name: &str) -> ID {
            let medicine = Medicine::new(Default::default(), name.into(), None);
            let id = medicine.id.clone();
            self.medicines.insert(id.clone(), medicine);
            id
        }

        fn add_schedule(&mut self, medicine_id: &ID) -> ID {
            let schedule = DoseSchedule::new(
                medicine_id.clone(),
                Default::default(),
                TimeOfDay::new(9, 0).unwrap(),
                RecurrencePattern {
                    rule: RecurrenceRule::Daily,
                    timezone: UTC,
                },
                true,
            );
            let id = schedule.id.clone();
            self.schedules.insert(id.clone(), schedule);
            id
        }

        fn add_instance(&mut self, schedule_id: &ID, date: Day, status: IntakeStatus) {
            let schedule = self.schedules.get(schedule_id).unwrap();
            let mut instance = DoseInstance::new(schedule, date);
            instance.status = status;
            self.instances.push(instance);
        }

        fn build(&self, now: i64) -> BTreeMap<Day, Vec<DayDot>> {
            build_day_indicators(&self.instances, &self.schedules, &self.medicines, now)
        }
    }

    fn noon_utc(date: &Day) -> i64 {
        date.timestamp_at(12 * 60 * 60 * 1000, &UTC)
    }

    #[test]
    fn one_missed_dose_taints_the_day() {
        assert_eq!(
            summarize_statuses(&[IntakeStatus::Taken, IntakeStatus::Missed]),
            Some(IntakeStatus::Missed)
        );
        assert_eq!(
            summarize_statuses(&[IntakeStatus::Taken, IntakeStatus::Taken]),
            Some(IntakeStatus::Taken)
        );
        assert_eq!(
            summarize_statuses(&[IntakeStatus::Taken, IntakeStatus::Skipped]),
            Some(IntakeStatus::Skipped)
        );
        assert_eq!(
            summarize_statuses(&[IntakeStatus::Taken, IntakeStatus::Scheduled]),
            Some(IntakeStatus::Scheduled)
        );
        assert_eq!(summarize_statuses(&[]), None);
    }

    #[test]
    fn it_orders_dots_by_severity_then_label() {
        let mut fixture = Fixture::new();
        let date = Day::new(2025, 3, 10);

        for (name, status) in [
            ("aspirin", IntakeStatus::Taken),
            ("zinc", IntakeStatus::Missed),
            ("biotin", IntakeStatus::Skipped),
            ("Citrate", IntakeStatus::Missed),
        ] {
            let medicine_id = fixture.add_medicine(name);
            let schedule_id = fixture.add_schedule(&medicine_id);
            fixture.add_instance(&schedule_id, date, status);
        }

        let indicators = fixture.build(noon_utc(&date));
        let dots = indicators.get(&date).unwrap();
        let summary: Vec<(&str, IntakeStatus)> = dots
            .iter()
            .map(|d| (d.label.as_str(), d.status))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("C", IntakeStatus::Missed),
                ("Z", IntakeStatus::Missed),
                ("B", IntakeStatus::Skipped),
                ("A", IntakeStatus::Taken),
            ]
        );
    }

    #[test]
    fn same_day_instances_for_one_medicine_fold_into_one_dot() {
        let mut fixture = Fixture::new();
        let date = Day::new(2025, 3, 10);
        let medicine_id = fixture.add_medicine("aspirin");
        let morning = fixture.add_schedule(&medicine_id);
        let evening = fixture.add_schedule(&medicine_id);
        fixture.add_instance(&morning, date, IntakeStatus::Taken);
        fixture.add_instance(&evening, date, IntakeStatus::Missed);

        let indicators = fixture.build(noon_utc(&date));
        let dots = indicators.get(&date).unwrap();
        assert_eq!(dots.len(), 1);
        assert_eq!(dots[0].status, IntakeStatus::Missed);
    }

    #[test]
    fn stale_scheduled_rows_from_past_days_are_excluded() {
        let mut fixture = Fixture::new();
        let medicine_id = fixture.add_medicine("aspirin");
        let schedule_id = fixture.add_schedule(&medicine_id);
        let yesterday = Day::new(2025, 3, 9);
        let today = Day::new(2025, 3, 10);
        fixture.add_instance(&schedule_id, yesterday, IntakeStatus::Scheduled);
        fixture.add_instance(&schedule_id, today, IntakeStatus::Scheduled);

        let indicators = fixture.build(today.timestamp_at(0, &UTC));
        assert!(indicators.get(&yesterday).is_none());
        assert_eq!(
            indicators.get(&today).unwrap()[0].status,
            IntakeStatus::Scheduled
        );
    }

    #[test]
    fn todays_scheduled_rows_past_the_deadline_read_as_missed() {
        let mut fixture = Fixture::new();
        let medicine_id = fixture.add_medicine("aspirin");
        let schedule_id = fixture.add_schedule(&medicine_id);
        let date = Day::new(2025, 3, 10);
        fixture.add_instance(&schedule_id, date, IntakeStatus::Scheduled);

        // Due 09:00, grace until 09:30
        let indicators = fixture.build(date.timestamp_at((9 * 60 + 31) * 60 * 1000, &UTC));
        assert_eq!(
            indicators.get(&date).unwrap()[0].status,
            IntakeStatus::Missed
        );
    }

    #[test]
    fn soft_deleted_medicines_and_schedules_are_filtered_out() {
        let mut fixture = Fixture::new();
        let date = Day::new(2025, 3, 10);

        let deleted_medicine = fixture.add_medicine("aspirin");
        let schedule_of_deleted = fixture.add_schedule(&deleted_medicine);
        fixture.add_instance(&schedule_of_deleted, date, IntakeStatus::Taken);
        fixture
            .medicines
            .get_mut(&deleted_medicine)
            .unwrap()
            .deleted_at = Some(1);

        let kept_medicine = fixture.add_medicine("biotin");
        let deleted_schedule = fixture.add_schedule(&kept_medicine);
        fixture.add_instance(&deleted_schedule, date, IntakeStatus::Taken);
        fixture
            .schedules
            .get_mut(&deleted_schedule)
            .unwrap()
            .deleted_at = Some(1);

        let indicators = fixture.build(noon_utc(&date));
        assert!(indicators.get(&date).is_none());
    }
}
