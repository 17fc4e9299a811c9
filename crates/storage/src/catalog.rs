use overload_domain::{EquipmentClass, ExerciseID, ExerciseLookup, ExerciseMetadata, MuscleGroup, Name};

pub const BENCH_PRESS: u128 = 1;
pub const BACK_SQUAT: u128 = 2;
pub const DEADLIFT: u128 = 3;
pub const OVERHEAD_PRESS: u128 = 4;
pub const BARBELL_ROW: u128 = 5;
pub const DUMBBELL_CURL: u128 = 6;
pub const LATERAL_RAISE: u128 = 7;
pub const CABLE_PUSHDOWN: u128 = 8;
pub const LEG_PRESS: u128 = 9;
pub const PLANK: u128 = 10;

struct CatalogEntry {
    id: u128,
    name: &'static str,
    equipment: EquipmentClass,
    muscle_group: MuscleGroup,
}

static ENTRIES: [CatalogEntry; 10] = [
    CatalogEntry {
        id: BENCH_PRESS,
        name: "Bench Press",
        equipment: EquipmentClass::Barbell,
        muscle_group: MuscleGroup::Chest,
    },
    CatalogEntry {
        id: BACK_SQUAT,
        name: "Back Squat",
        equipment: EquipmentClass::Barbell,
        muscle_group: MuscleGroup::Legs,
    },
    CatalogEntry {
        id: DEADLIFT,
        name: "Deadlift",
        equipment: EquipmentClass::Barbell,
        muscle_group: MuscleGroup::Back,
    },
    CatalogEntry {
        id: OVERHEAD_PRESS,
        name: "Overhead Press",
        equipment: EquipmentClass::Barbell,
        muscle_group: MuscleGroup::Shoulders,
    },
    CatalogEntry {
        id: BARBELL_ROW,
        name: "Barbell Row",
        equipment: EquipmentClass::Barbell,
        muscle_group: MuscleGroup::Back,
    },
    CatalogEntry {
        id: DUMBBELL_CURL,
        name: "Dumbbell Curl",
        equipment: EquipmentClass::Dumbbell,
        muscle_group: MuscleGroup::Arms,
    },
    CatalogEntry {
        id: LATERAL_RAISE,
        name: "Lateral Raise",
        equipment: EquipmentClass::Dumbbell,
        muscle_group: MuscleGroup::Shoulders,
    },
    CatalogEntry {
        id: CABLE_PUSHDOWN,
        name: "Cable Pushdown",
        equipment: EquipmentClass::Cable,
        muscle_group: MuscleGroup::Arms,
    },
    CatalogEntry {
        id: LEG_PRESS,
        name: "Leg Press",
        equipment: EquipmentClass::Machine,
        muscle_group: MuscleGroup::Legs,
    },
    CatalogEntry {
        id: PLANK,
        name: "Plank",
        equipment: EquipmentClass::Bodyweight,
        muscle_group: MuscleGroup::Core,
    },
];

/// Built-in exercise catalog. User-defined exercises live in their own
/// repository; this covers the common movements the app ships with.
pub struct StaticCatalog;

impl ExerciseLookup for StaticCatalog {
    fn metadata(&self, id: ExerciseID) -> Option<ExerciseMetadata> {
        let entry = ENTRIES.iter().find(|e| ExerciseID::from(e.id) == id)?;
        let name = Name::new(entry.name).ok()?;
        Some(ExerciseMetadata {
            id,
            name,
            equipment: entry.equipment,
            muscle_group: entry.muscle_group,
        })
    }
}
