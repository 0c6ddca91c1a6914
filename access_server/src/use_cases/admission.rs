use crate::domain::entities::{EventType, Role};

// What the caller learned about assistant occupancy before deciding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OccupancyReading {
    Present(usize),
    Unavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialCase {
    LabClosed,
}

impl SpecialCase {
    pub fn code(self) -> &'static str {
        match self {
            SpecialCase::LabClosed => "LABORATORIO_CERRADO",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SpecialCase::LabClosed => "Laboratorio Cerrado",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            SpecialCase::LabClosed => "Tocar Timbre",
        }
    }

    pub fn style(self) -> &'static str {
        match self {
            SpecialCase::LabClosed => "warning",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdmissionDecision {
    pub authorized: bool,
    pub reason: &'static str,
    pub assistants_present: bool,
    pub special_case: Option<SpecialCase>,
}

// Door policy. Students may enter only while enough assistants are inside.
#[derive(Clone, Copy, Debug)]
pub struct AdmissionPolicy {
    pub min_assistants_present: usize,
}

impl AdmissionPolicy {
    pub fn decide(
        &self,
        role: Role,
        event_type: EventType,
        occupancy: OccupancyReading,
    ) -> AdmissionDecision {
        let assistants_present = matches!(occupancy, OccupancyReading::Present(count) if count > 0);

        if event_type == EventType::Exit {
            return AdmissionDecision {
                authorized: false,
                reason: "Salida registrada - no requiere apertura",
                assistants_present,
                special_case: None,
            };
        }

        match (role, occupancy) {
            (Role::Assistant, _) => AdmissionDecision {
                authorized: true,
                reason: "Ayudante autorizado - entrada permitida",
                assistants_present,
                special_case: None,
            },
            (Role::Student, OccupancyReading::Present(count))
                if count >= self.min_assistants_present =>
            {
                AdmissionDecision {
                    authorized: true,
                    reason: "Estudiante autorizado - ayudantes presentes",
                    assistants_present,
                    special_case: None,
                }
            }
            (Role::Student, OccupancyReading::Present(0)) => lab_closed(
                "Laboratorio cerrado - no hay ayudantes presentes",
                assistants_present,
            ),
            (Role::Student, OccupancyReading::Present(_)) => lab_closed(
                "Laboratorio cerrado - ayudantes presentes insuficientes",
                assistants_present,
            ),
            // Fail closed whenever occupancy could not be established.
            (Role::Student, OccupancyReading::Unavailable) => lab_closed(
                "Laboratorio cerrado - no fue posible verificar ayudantes",
                assistants_present,
            ),
        }
    }
}

fn lab_closed(reason: &'static str, assistants_present: bool) -> AdmissionDecision {
    AdmissionDecision {
        authorized: false,
        reason,
        assistants_present,
        special_case: Some(SpecialCase::LabClosed),
    }
}
