use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::{Color, Result, SceneError};

/// Concrete edit routed from the debug panel to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "parameter", content = "value")]
pub enum ParameterUpdate {
    AtmosphereDayColor(Color),
    AtmosphereTwilightColor(Color),
    SunPhi(f32),
    SunTheta(f32),
}

/// A named control shown on the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binding {
    pub name: &'static str,
    pub range: Option<(f32, f32)>,
}

pub const BINDINGS: [Binding; 4] = [
    Binding {
        name: "atmosphere_day_color",
        range: None,
    },
    Binding {
        name: "atmosphere_twilight_color",
        range: None,
    },
    Binding {
        name: "sun_phi",
        range: Some((0.0, PI)),
    },
    Binding {
        name: "sun_theta",
        range: Some((-PI, PI)),
    },
];

/// Debug panel state: the current value of every binding plus the edits that
/// have not been applied to the scene yet.
#[derive(Debug, Clone)]
pub struct ParameterPanel {
    pub atmosphere_day_color: Color,
    pub atmosphere_twilight_color: Color,
    pub sun_phi: f32,
    pub sun_theta: f32,
    visible: bool,
    pending: Vec<ParameterUpdate>,
}

impl ParameterPanel {
    /// Creates a hidden panel seeded from the configuration.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            atmosphere_day_color: config.earth.atmosphere_day_color,
            atmosphere_twilight_color: config.earth.atmosphere_twilight_color,
            sun_phi: config.sun.phi,
            sun_theta: config.sun.theta,
            visible: false,
            pending: Vec::new(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_atmosphere_day_color(&mut self, color: Color) {
        self.atmosphere_day_color = color;
        self.pending.push(ParameterUpdate::AtmosphereDayColor(color));
    }

    pub fn set_atmosphere_twilight_color(&mut self, color: Color) {
        self.atmosphere_twilight_color = color;
        self.pending
            .push(ParameterUpdate::AtmosphereTwilightColor(color));
    }

    pub fn set_sun_phi(&mut self, phi: f32) {
        self.sun_phi = clamp_to("sun_phi", phi);
        self.pending.push(ParameterUpdate::SunPhi(self.sun_phi));
    }

    pub fn set_sun_theta(&mut self, theta: f32) {
        self.sun_theta = clamp_to("sun_theta", theta);
        self.pending.push(ParameterUpdate::SunTheta(self.sun_theta));
    }

    /// Sets a binding from its textual form, e.g. `("sun_phi", "1.2")`.
    pub fn set_by_name(&mut self, name: &str, raw: &str) -> Result<()> {
        match name {
            "atmosphere_day_color" => self.set_atmosphere_day_color(raw.parse()?),
            "atmosphere_twilight_color" => self.set_atmosphere_twilight_color(raw.parse()?),
            "sun_phi" => self.set_sun_phi(parse_angle(raw)?),
            "sun_theta" => self.set_sun_theta(parse_angle(raw)?),
            _ => return Err(SceneError::UnknownParameter(name.to_string())),
        }
        tracing::debug!(parameter = name, value = raw, "panel edit");
        Ok(())
    }

    /// Parses and applies a `name=value` assignment.
    pub fn assign(&mut self, assignment: &str) -> Result<()> {
        let (name, raw) = assignment
            .split_once('=')
            .ok_or(SceneError::InvalidInput("expected `name=value`"))?;
        self.set_by_name(name.trim(), raw.trim())
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Hands the queued edits over, oldest first.
    pub fn drain(&mut self) -> Vec<ParameterUpdate> {
        std::mem::take(&mut self.pending)
    }
}

fn clamp_to(name: &str, value: f32) -> f32 {
    BINDINGS
        .iter()
        .find(|binding| binding.name == name)
        .and_then(|binding| binding.range)
        .map(|(min, max)| value.clamp(min, max))
        .unwrap_or(value)
}

fn parse_angle(raw: &str) -> Result<f32> {
    let value: f32 = raw
        .parse()
        .map_err(|_| SceneError::msg(format!("`{raw}` is not a number")))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SceneError::InvalidInput("angles must be finite"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> ParameterPanel {
        ParameterPanel::new(&AppConfig::default())
    }

    #[test]
    fn starts_hidden_with_configured_values() {
        let panel = panel();
        assert!(!panel.is_visible());
        assert_eq!(panel.atmosphere_day_color.to_hex(), "#00aaff");
        assert!(!panel.has_pending());
    }

    #[test]
    fn clamps_angles_to_their_ranges() {
        let mut panel = panel();
        panel.set_sun_phi(4.0);
        panel.set_sun_theta(-9.0);
        assert_eq!(panel.sun_phi, PI);
        assert_eq!(panel.sun_theta, -PI);
        assert_eq!(
            panel.drain(),
            vec![ParameterUpdate::SunPhi(PI), ParameterUpdate::SunTheta(-PI)]
        );
        assert!(!panel.has_pending());
    }

    #[test]
    fn assignments_parse_colors_and_angles() {
        let mut panel = panel();
        panel.assign("atmosphere_day_color = #ff0000").unwrap();
        panel.assign("sun_theta=1.5").unwrap();
        assert_eq!(panel.atmosphere_day_color.to_hex(), "#ff0000");
        assert_eq!(panel.sun_theta, 1.5);
        assert_eq!(panel.drain().len(), 2);
    }

    #[test]
    fn rejects_unknown_or_malformed_assignments() {
        let mut panel = panel();
        assert!(matches!(
            panel.assign("moon_phase=1"),
            Err(SceneError::UnknownParameter(_))
        ));
        assert!(panel.assign("sun_phi").is_err());
        assert!(panel.assign("sun_phi=north").is_err());
        assert!(panel.assign("sun_phi=NaN").is_err());
        assert!(!panel.has_pending());
    }
}
