mod channel;
mod day;
mod dispatch;
mod dose_instance;
mod indicator;
mod medicine;
mod recurrence;
mod schedule;
mod shared;

pub use channel::{InvalidChannelEndpointError, NotificationChannel};
pub use day::{get_month_length, is_leap_year, Day, InvalidDateError, YearMonth};
pub use dispatch::{DispatchKind, DispatchRecord};
pub use dose_instance::{
    DoseInstance, IntakeStatus, InvalidStatusTransition, StatusSource, INTAKE_GRACE_PERIOD_MILLIS,
};
pub use indicator::{build_day_indicators, summarize_statuses, DayDot};
pub use medicine::Medicine;
pub use recurrence::{InvalidRecurrenceError, RecurrencePattern, RecurrenceRule};
pub use schedule::{DoseSchedule, InvalidTimeOfDayError, TimeOfDay};
pub use shared::entity::{Entity, ID};
