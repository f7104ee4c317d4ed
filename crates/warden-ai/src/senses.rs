//! Perception: subject capabilities, world queries and the hearing scan.

use glam::Vec3;
use warden_common::{facing_angle_deg, SubjectId};

/// Something an agent can perceive.
///
/// Agents never see the concrete subject type, only these capabilities.
pub trait Subject {
    /// Stable identity.
    fn id(&self) -> SubjectId;
    /// Current position.
    fn position(&self) -> Vec3;
    /// Whether the subject is making audible noise (e.g. footsteps).
    fn is_emitting_noise(&self) -> bool;
    /// Whether the subject is hidden (e.g. inside a cabinet).
    fn is_concealed(&self) -> bool;
}

/// World-side lookup of subjects.
pub trait SubjectQuery {
    /// All subjects within `radius` of `center`, in scan order.
    fn subjects_within(&self, center: Vec3, radius: f32) -> Vec<&dyn Subject>;
    /// Resolves a subject by id; `None` once it no longer exists.
    fn subject(&self, id: SubjectId) -> Option<&dyn Subject>;
}

/// A subject picked up by the hearing scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heard {
    /// Who was heard
    pub subject: SubjectId,
    /// Where they were
    pub position: Vec3,
    /// Distance from the listener
    pub distance: f32,
    /// Angle off the listener's facing, in degrees
    pub angle: f32,
}

/// Scans for a noisy subject inside the hearing cone.
///
/// The first qualifying subject in scan order wins.
pub fn hear(
    query: &dyn SubjectQuery,
    origin: Vec3,
    forward: Vec3,
    radius: f32,
    cone_deg: f32,
) -> Option<Heard> {
    let half_cone = cone_deg / 2.0;

    query
        .subjects_within(origin, radius)
        .into_iter()
        .find_map(|subject| {
            let to_subject = subject.position() - origin;
            let angle = facing_angle_deg(forward, to_subject);
            (angle <= half_cone && subject.is_emitting_noise()).then(|| Heard {
                subject: subject.id(),
                position: subject.position(),
                distance: to_subject.length(),
                angle,
            })
        })
}

/// Mock subject for testing.
#[derive(Debug, Clone, PartialEq)]
pub struct MockSubject {
    /// Identity
    pub id: SubjectId,
    /// Position
    pub position: Vec3,
    /// Making noise
    pub noisy: bool,
    /// Hidden
    pub concealed: bool,
}

impl MockSubject {
    /// Creates a quiet, visible subject.
    #[must_use]
    pub fn new(id: SubjectId, position: Vec3) -> Self {
        Self {
            id,
            position,
            noisy: false,
            concealed: false,
        }
    }

    /// Sets whether the subject makes noise.
    #[must_use]
    pub const fn noisy(mut self, noisy: bool) -> Self {
        self.noisy = noisy;
        self
    }
}

impl Subject for MockSubject {
    fn id(&self) -> SubjectId {
        self.id
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn is_emitting_noise(&self) -> bool {
        self.noisy
    }

    fn is_concealed(&self) -> bool {
        self.concealed
    }
}

/// Mock subject registry for testing. Scan order is insertion order.
#[derive(Debug, Clone, Default)]
pub struct MockSubjects {
    subjects: Vec<MockSubject>,
}

impl MockSubjects {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subject.
    pub fn add(&mut self, subject: MockSubject) {
        self.subjects.push(subject);
    }

    /// Mutable access by id.
    pub fn get_mut(&mut self, id: SubjectId) -> Option<&mut MockSubject> {
        self.subjects.iter_mut().find(|s| s.id == id)
    }

    /// Removes a subject.
    pub fn remove(&mut self, id: SubjectId) {
        self.subjects.retain(|s| s.id != id);
    }
}

impl SubjectQuery for MockSubjects {
    fn subjects_within(&self, center: Vec3, radius: f32) -> Vec<&dyn Subject> {
        self.subjects
            .iter()
            .filter(|s| s.position.distance(center) <= radius)
            .map(|s| s as &dyn Subject)
            .collect()
    }

    fn subject(&self, id: SubjectId) -> Option<&dyn Subject> {
        self.subjects
            .iter()
            .find(|s| s.id == id)
            .map(|s| s as &dyn Subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world(subjects: Vec<MockSubject>) -> MockSubjects {
        let mut world = MockSubjects::new();
        for subject in subjects {
            world.add(subject);
        }
        world
    }

    #[test]
    fn test_hear_noisy_subject_ahead() {
        let id = SubjectId::from_raw(1);
        let world = world(vec![
            MockSubject::new(id, Vec3::new(0.0, 0.0, 3.0)).noisy(true)
        ]);

        let heard = hear(&world, Vec3::ZERO, Vec3::Z, 5.0, 90.0).expect("heard");
        assert_eq!(heard.subject, id);
        assert!((heard.distance - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_quiet_subject_not_heard() {
        let world = world(vec![MockSubject::new(
            SubjectId::from_raw(1),
            Vec3::new(0.0, 0.0, 3.0),
        )]);
        assert!(hear(&world, Vec3::ZERO, Vec3::Z, 5.0, 90.0).is_none());
    }

    #[test]
    fn test_subject_outside_cone_not_heard() {
        // 90 degrees off a 90 degree cone (45 half-angle).
        let world = world(vec![
            MockSubject::new(SubjectId::from_raw(1), Vec3::new(3.0, 0.0, 0.0)).noisy(true),
        ]);
        assert!(hear(&world, Vec3::ZERO, Vec3::Z, 5.0, 90.0).is_none());
        assert!(hear(&world, Vec3::ZERO, Vec3::Z, 5.0, 180.0).is_some());
    }

    #[test]
    fn test_subject_outside_radius_not_heard() {
        let world = world(vec![
            MockSubject::new(SubjectId::from_raw(1), Vec3::new(0.0, 0.0, 6.0)).noisy(true),
        ]);
        assert!(hear(&world, Vec3::ZERO, Vec3::Z, 5.0, 90.0).is_none());
    }

    #[test]
    fn test_first_in_scan_order_wins() {
        let far = SubjectId::from_raw(1);
        let near = SubjectId::from_raw(2);
        let world = world(vec![
            MockSubject::new(far, Vec3::new(0.0, 0.0, 4.0)).noisy(true),
            MockSubject::new(near, Vec3::new(0.0, 0.0, 1.0)).noisy(true),
        ]);

        let heard = hear(&world, Vec3::ZERO, Vec3::Z, 5.0, 90.0).expect("heard");
        assert_eq!(heard.subject, far);
    }

    #[test]
    fn test_subject_lookup() {
        let id = SubjectId::from_raw(7);
        let mut world = world(vec![MockSubject::new(id, Vec3::ZERO)]);
        assert!(world.subject(id).is_some());
        world.remove(id);
        assert!(world.subject(id).is_none());
    }
}
