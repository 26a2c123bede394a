pub mod schedule;
pub mod stats;
pub mod utilization;
pub mod validation;

pub use schedule::{
    build_schedule, generate_schedule, PaymentEvent, PaymentKind, ScheduleInput, ScheduleOutput,
};
pub use stats::{analyze_progress, compute_stats, compute_stats_as_of, split_schedule, LoanStats};
pub use utilization::{yearly_utilization, UtilizationInput, YearlyUtilization};
pub use validation::{check_profile, validate_profile, ProfileCheck};
