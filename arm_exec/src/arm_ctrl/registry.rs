//! Servo registry
//!
//! A fixed table of the arm's servos, built once during initialisation.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::ServoParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One servo of the arm.
///
/// Name, bounds and channel never change after construction. Both angles are
/// always within `[min_angle, max_angle]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Servo {
    name: String,
    min_angle: u8,
    max_angle: u8,
    channel: u8,

    current_angle: u8,
    desired_angle: u8,
}

/// Ordered, fixed length table of servos.
#[derive(Debug, Default)]
pub struct ServoRegistry {
    servos: Vec<Servo>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Servo {
    /// Build a servo parked at its initial angle.
    ///
    /// The parameters must have been validated.
    pub fn new(params: &ServoParams) -> Self {
        Self {
            name: params.name.clone(),
            min_angle: params.min_angle,
            max_angle: params.max_angle,
            channel: params.channel,
            current_angle: params.initial_angle,
            desired_angle: params.initial_angle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_angle(&self) -> u8 {
        self.min_angle
    }

    pub fn max_angle(&self) -> u8 {
        self.max_angle
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// The last angle output to the hardware.
    pub fn current_angle(&self) -> u8 {
        self.current_angle
    }

    /// The angle the servo is moving towards.
    pub fn desired_angle(&self) -> u8 {
        self.desired_angle
    }

    /// True if the servo has reached its desired angle.
    pub fn converged(&self) -> bool {
        self.current_angle == self.desired_angle
    }

    /// True if `angle` is within the servo's bounds.
    pub fn in_bounds(&self, angle: i64) -> bool {
        angle >= self.min_angle as i64 && angle <= self.max_angle as i64
    }

    /// Set the desired angle. Callers check the bounds first.
    pub(crate) fn set_desired_angle(&mut self, angle: u8) {
        debug_assert!(self.in_bounds(angle as i64));
        self.desired_angle = angle;
    }

    /// Move the current angle one degree towards the desired angle.
    ///
    /// Returns true if the current angle changed.
    pub(crate) fn step(&mut self) -> bool {
        if self.desired_angle > self.current_angle && self.current_angle < self.max_angle {
            self.current_angle += 1;
            true
        } else if self.desired_angle < self.current_angle && self.current_angle > self.min_angle {
            self.current_angle -= 1;
            true
        } else {
            false
        }
    }
}

impl ServoRegistry {
    /// Build the registry from validated servo parameters.
    pub fn new(params: &[ServoParams]) -> Self {
        Self {
            servos: params.iter().map(Servo::new).collect(),
        }
    }

    /// Find a servo by name.
    ///
    /// Names are matched exactly and case-sensitively. `None` and names not
    /// in the table both give `None`.
    pub fn find_by_name(&self, name: Option<&str>) -> Option<&Servo> {
        self.index_of(name).map(|i| &self.servos[i])
    }

    /// Find a servo by name, see [`ServoRegistry::find_by_name`].
    pub fn find_by_name_mut(&mut self, name: Option<&str>) -> Option<&mut Servo> {
        match self.index_of(name) {
            Some(i) => Some(&mut self.servos[i]),
            None => None,
        }
    }

    /// Position of the named servo in the table.
    pub fn index_of(&self, name: Option<&str>) -> Option<usize> {
        let name = name?;
        self.servos.iter().position(|s| s.name == name)
    }

    pub fn get(&self, index: usize) -> Option<&Servo> {
        self.servos.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Servo> {
        self.servos.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Servo> {
        self.servos.iter()
    }

    pub fn len(&self) -> usize {
        self.servos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servos.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn servo_params(name: &str, min: u8, max: u8, initial: u8) -> ServoParams {
        ServoParams {
            name: name.into(),
            min_angle: min,
            max_angle: max,
            channel: 0,
            initial_angle: initial,
        }
    }

    #[test]
    fn test_find_by_name() {
        let names = ["base", "shoulder", "elbow", "wrist", "grabber"];
        let params: Vec<_> = names
            .iter()
            .map(|n| servo_params(n, 0, 180, 90))
            .collect();
        let reg = ServoRegistry::new(&params);

        assert_eq!(reg.len(), names.len());
        for (i, name) in names.iter().copied().enumerate() {
            assert_eq!(reg.find_by_name(Some(name)).map(|s| s.name()), Some(name));
            assert_eq!(reg.index_of(Some(name)), Some(i));
        }

        assert!(reg.find_by_name(None).is_none());
        assert!(reg.find_by_name(Some("")).is_none());
        assert!(reg.find_by_name(Some("Wrist")).is_none());
        assert!(reg.find_by_name(Some("wrist ")).is_none());
        assert!(reg.find_by_name(Some("hand")).is_none());
    }

    #[test]
    fn test_step_up_and_down() {
        let mut servo = Servo::new(&servo_params("wrist", 10, 170, 90));

        servo.set_desired_angle(93);
        assert!(servo.step());
        assert!(servo.step());
        assert!(servo.step());
        assert_eq!(servo.current_angle(), 93);
        assert!(servo.converged());
        assert!(!servo.step());
        assert_eq!(servo.current_angle(), 93);

        servo.set_desired_angle(91);
        assert!(servo.step());
        assert_eq!(servo.current_angle(), 92);
        assert!(servo.step());
        assert!(!servo.step());
        assert_eq!(servo.current_angle(), 91);
    }

    #[test]
    fn test_step_pinned_at_bound() {
        // Bounds equal, nowhere to go
        let mut servo = Servo::new(&servo_params("grabber", 45, 45, 45));
        assert!(!servo.step());
        assert_eq!(servo.current_angle(), 45);
        assert!(servo.in_bounds(45));
        assert!(!servo.in_bounds(44));
        assert!(!servo.in_bounds(-1));
    }
}
