use std::slice::Iter;

use derive_more::{AsRef, Deref, Display};
use uuid::Uuid;

use crate::formula::{DEFAULT_INCREMENT, ISOLATION_INCREMENT};

/// Narrow interface to the exercise metadata catalog.
///
/// The catalog itself (names, descriptions, instructions) is an external
/// collaborator; the engine only needs the attributes that influence weight
/// selection.
pub trait ExerciseLookup {
    fn metadata(&self, id: ExerciseID) -> Option<ExerciseMetadata>;
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(Uuid);

impl ExerciseID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for ExerciseID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for ExerciseID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    pub fn new(name: &str) -> Result<Self, NameError> {
        let trimmed_name = name.trim();

        if trimmed_name.is_empty() {
            return Err(NameError::Empty);
        }

        let len = trimmed_name.len();

        if len > 64 {
            return Err(NameError::TooLong(len));
        }

        Ok(Name(trimmed_name.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,
    #[error("Name must be 64 characters or fewer ({0} > 64)")]
    TooLong(usize),
}

#[derive(Debug, Clone, Copy, Display, PartialEq, Eq, PartialOrd, Ord)]
pub enum EquipmentClass {
    Barbell,
    Dumbbell,
    Machine,
    Cable,
    Bodyweight,
}

impl EquipmentClass {
    pub fn iter() -> Iter<'static, EquipmentClass> {
        static EQUIPMENT_CLASSES: [EquipmentClass; 5] = [
            EquipmentClass::Barbell,
            EquipmentClass::Dumbbell,
            EquipmentClass::Machine,
            EquipmentClass::Cable,
            EquipmentClass::Bodyweight,
        ];
        EQUIPMENT_CLASSES.iter()
    }

    /// Smallest loadable step for this equipment class.
    ///
    /// Dumbbell and cable work moves in 2.5-unit steps, everything else in
    /// 5-unit plate pairs.
    #[must_use]
    pub fn round_increment(self) -> f64 {
        match self {
            EquipmentClass::Dumbbell | EquipmentClass::Cable => ISOLATION_INCREMENT,
            EquipmentClass::Barbell | EquipmentClass::Machine | EquipmentClass::Bodyweight => {
                DEFAULT_INCREMENT
            }
        }
    }

    /// Step between successive max attempts.
    #[must_use]
    pub fn attempt_increment(self) -> f64 {
        match self {
            EquipmentClass::Dumbbell => ISOLATION_INCREMENT,
            _ => DEFAULT_INCREMENT,
        }
    }
}

#[derive(Debug, Clone, Copy, Display, PartialEq, Eq, PartialOrd, Ord)]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Arms,
    Legs,
    Core,
}

impl MuscleGroup {
    pub fn iter() -> Iter<'static, MuscleGroup> {
        static MUSCLE_GROUPS: [MuscleGroup; 6] = [
            MuscleGroup::Chest,
            MuscleGroup::Back,
            MuscleGroup::Shoulders,
            MuscleGroup::Arms,
            MuscleGroup::Legs,
            MuscleGroup::Core,
        ];
        MUSCLE_GROUPS.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseMetadata {
    pub id: ExerciseID,
    pub name: Name,
    pub equipment: EquipmentClass,
    pub muscle_group: MuscleGroup,
}

impl ExerciseMetadata {
    #[must_use]
    pub fn round_increment(&self) -> f64 {
        self.equipment.round_increment()
    }

    #[must_use]
    pub fn attempt_increment(&self) -> f64 {
        self.equipment.attempt_increment()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Bench Press", Ok(Name("Bench Press".to_string())))]
    #[case("  Squat  ", Ok(Name("Squat".to_string())))]
    #[case("", Err(NameError::Empty))]
    #[case("   ", Err(NameError::Empty))]
    #[case(
        "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
        Err(NameError::TooLong(65))
    )]
    fn test_name_new(#[case] name: &str, #[case] expected: Result<Name, NameError>) {
        assert_eq!(Name::new(name), expected);
    }

    #[test]
    fn test_exercise_id_nil() {
        assert!(ExerciseID::nil().is_nil());
        assert_eq!(ExerciseID::nil(), ExerciseID::default());
        assert!(!ExerciseID::from(1).is_nil());
    }

    #[rstest]
    #[case(EquipmentClass::Barbell, 5.0, 5.0)]
    #[case(EquipmentClass::Dumbbell, 2.5, 2.5)]
    #[case(EquipmentClass::Machine, 5.0, 5.0)]
    #[case(EquipmentClass::Cable, 2.5, 5.0)]
    #[case(EquipmentClass::Bodyweight, 5.0, 5.0)]
    fn test_equipment_class_increments(
        #[case] equipment: EquipmentClass,
        #[case] round_increment: f64,
        #[case] attempt_increment: f64,
    ) {
        assert_eq!(equipment.round_increment(), round_increment);
        assert_eq!(equipment.attempt_increment(), attempt_increment);
    }

    #[test]
    fn test_equipment_class_iter() {
        assert_eq!(EquipmentClass::iter().count(), 5);
    }

    #[test]
    fn test_muscle_group_iter() {
        assert_eq!(MuscleGroup::iter().count(), 6);
    }
}
