// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

/// A single revolute joint of a planar linkage.
#[derive(Clone, Debug, PartialEq)]
pub struct Joint {
    name: String,
    bounds: (f32, f32),
    radius: f32,
}

impl Joint {
    /// Construct a new joint.
    ///
    /// The joint is unbounded and has a unit radius until configured.
    pub fn new(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            bounds: (-f32::INFINITY, f32::INFINITY),
            radius: 1.0,
        }
    }

    /// Set the angle limits in radians.
    pub fn set_bounds(mut self, lower: f32, upper: f32) -> Self {
        self.bounds = (lower, upper);
        self
    }

    /// Set the link radius.
    ///
    /// The radius converts a positional error into an angular step for this
    /// joint. For a simple lever this is the lever arm length.
    pub fn set_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn bounds(&self) -> (f32, f32) {
        self.bounds
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Check if the angle lies within the joint bounds.
    #[inline]
    pub fn contains(&self, angle: f32) -> bool {
        angle >= self.bounds.0 && angle <= self.bounds.1
    }
}

impl std::fmt::Display for Joint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{:.2}°, {:.2}°] r={:.2}",
            self.name,
            self.bounds.0.to_degrees(),
            self.bounds.1.to_degrees(),
            self.radius
        )
    }
}

/// Ordered sequence of joints from the base to the end effector.
///
/// The chain only describes the static properties of the joints. Joint angles
/// are owned by the caller and passed alongside the chain.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JointChain {
    joints: Vec<Joint>,
}

impl JointChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_joint(mut self, joint: Joint) -> Self {
        self.joints.push(joint);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    #[inline]
    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    pub fn joint_by_name(&self, name: &str) -> Option<&Joint> {
        self.iter().find(|joint| joint.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Joint> {
        self.joints.iter()
    }

    /// Check if all angles lie within the bounds of their joint.
    pub fn is_within_bounds(&self, angles: &[f32]) -> bool {
        angles.len() == self.len()
            && self
                .iter()
                .zip(angles)
                .all(|(joint, angle)| joint.contains(*angle))
    }

    /// Validate the chain for use with an angle buffer of the given length.
    pub(crate) fn validate(&self, angle_count: usize) -> Result<(), &'static str> {
        if self.joints.is_empty() {
            return Err("chain has no joints");
        }
        if angle_count != self.joints.len() {
            return Err("angle count does not match joint count");
        }
        if self
            .iter()
            .any(|joint| joint.radius == 0.0 || !joint.radius.is_finite())
        {
            return Err("joint radius must be finite and non-zero");
        }

        Ok(())
    }
}

impl std::fmt::Display for JointChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joints: Vec<String> = self.iter().map(|joint| joint.to_string()).collect();

        write!(f, "{}", joints.join(" -> "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg() -> JointChain {
        JointChain::new()
            .add_joint(
                Joint::new("upper")
                    .set_bounds(-60_f32.to_radians(), 25_f32.to_radians())
                    .set_radius(30.0),
            )
            .add_joint(
                Joint::new("lower")
                    .set_bounds(-55_f32.to_radians(), 55_f32.to_radians())
                    .set_radius(30.0),
            )
    }

    #[test]
    fn test_chain_lookup() {
        let chain = leg();

        assert_eq!(chain.len(), 2);
        assert_eq!(chain.joint(1).map(|joint| joint.name()), Some("lower"));
        assert_eq!(chain.joint_by_name("upper").map(|joint| joint.radius()), Some(30.0));
        assert!(chain.joint(2).is_none());
    }

    #[test]
    fn test_within_bounds() {
        let chain = leg();

        assert!(chain.is_within_bounds(&[0.0, 0.0]));
        assert!(chain.is_within_bounds(&[25_f32.to_radians(), -55_f32.to_radians()]));
        assert!(!chain.is_within_bounds(&[0.5, 0.0]));
        assert!(!chain.is_within_bounds(&[0.0]));
    }

    #[test]
    fn test_validate() {
        assert!(leg().validate(2).is_ok());
        assert!(leg().validate(3).is_err());
        assert!(JointChain::new().validate(0).is_err());

        let chain = JointChain::new().add_joint(Joint::new("slack").set_radius(0.0));
        assert!(chain.validate(1).is_err());
    }
}
