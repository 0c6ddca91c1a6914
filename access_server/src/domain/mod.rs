// Domain layer: attendance records, roles and the ports the use cases depend on.

pub mod calendar;
pub mod door;
pub mod entities;
pub mod errors;
pub mod ports;

pub use calendar::{LabCalendar, LabStamp};
pub use door::{DoorActuator, DoorCommand, DoorError};
pub use entities::{
    AttendanceDraft, AttendanceEvent, EventType, OccupancySnapshot, Person, PresentPerson, Role,
    ScanPayload,
};
pub use errors::{ScanError, ValidationError};
pub use ports::{AttendanceLedger, Clock, PersonDirectory};
