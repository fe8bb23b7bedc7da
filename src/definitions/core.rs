use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::classifier::ViewportClassifier;
use crate::error::{ClassifierError, DefinitionError};

/// Callback invoked with the classifier that fired it.
pub type Callback = Arc<dyn Fn(&mut ViewportClassifier) + Send + Sync>;

/// Breakpoint name → range, in insertion order.
pub type WidthDefinitions = IndexMap<String, RangeDefinition>;

/// Which of a range's two boundaries are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Inclusion {
    /// `[]`
    Both,
    /// `()`
    Neither,
    /// `[)`
    MinOnly,
    /// `(]`
    MaxOnly,
}

impl Inclusion {
    pub const ALL: [Inclusion; 4] = [Self::Both, Self::Neither, Self::MinOnly, Self::MaxOnly];

    pub fn token(&self) -> &'static str {
        match self {
            Self::Both => "[]",
            Self::Neither => "()",
            Self::MinOnly => "[)",
            Self::MaxOnly => "(]",
        }
    }

    /// Parse one of the four two-character tokens.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "[]" => Some(Self::Both),
            "()" => Some(Self::Neither),
            "[)" => Some(Self::MinOnly),
            "(]" => Some(Self::MaxOnly),
            _ => None,
        }
    }

    pub fn includes_start(&self) -> bool {
        matches!(self, Self::Both | Self::MinOnly)
    }

    pub fn includes_end(&self) -> bool {
        matches!(self, Self::Both | Self::MaxOnly)
    }

    /// Whether `width` falls inside `min..max` under this boundary mode.
    pub fn contains(&self, width: f64, min: f64, max: f64) -> bool {
        let start_pass = if self.includes_start() {
            width >= min
        } else {
            width > min
        };
        let end_pass = if self.includes_end() {
            width <= max
        } else {
            width < max
        };
        start_pass && end_pass
    }
}

impl fmt::Display for Inclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Re-checks a raw inclusion token before classifying `width`.
pub fn is_width_included(
    name: &str,
    width: f64,
    min: f64,
    max: f64,
    token: &str,
) -> Result<bool, ClassifierError> {
    let inclusion = Inclusion::parse(token).ok_or_else(|| ClassifierError::InvalidInclusion {
        name: name.to_string(),
        token: token.to_string(),
    })?;
    Ok(inclusion.contains(width, min, max))
}

/// Callback slot on a breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Enter,
    Inside,
    Leave,
}

impl Phase {
    pub fn token(&self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Inside => "inside",
            Self::Leave => "leave",
        }
    }

    /// Name of the slot the phase maps to.
    pub fn slot(&self) -> &'static str {
        match self {
            Self::Enter => "onEnter",
            Self::Inside => "whileInside",
            Self::Leave => "onLeave",
        }
    }
}

impl FromStr for Phase {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enter" => Ok(Self::Enter),
            "inside" => Ok(Self::Inside),
            "leave" => Ok(Self::Leave),
            other => Err(ClassifierError::InvalidPhase {
                phase: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A named width range plus its optional transition callbacks.
#[derive(Clone)]
pub struct RangeDefinition {
    pub min: f64,
    pub max: f64,
    pub inclusion: Inclusion,
    pub on_enter: Option<Callback>,
    pub while_inside: Option<Callback>,
    pub on_leave: Option<Callback>,
}

impl RangeDefinition {
    pub fn new(min: f64, max: f64, inclusion: Inclusion) -> Self {
        Self {
            min,
            max,
            inclusion,
            on_enter: None,
            while_inside: None,
            on_leave: None,
        }
    }

    /// `[min, max]`
    pub fn inclusive(min: f64, max: f64) -> Self {
        Self::new(min, max, Inclusion::Both)
    }

    /// `[min, ∞)`
    pub fn at_least(min: f64) -> Self {
        Self::new(min, f64::INFINITY, Inclusion::Both)
    }

    pub fn on_enter<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut ViewportClassifier) + Send + Sync + 'static,
    {
        self.on_enter = Some(Arc::new(callback));
        self
    }

    pub fn while_inside<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut ViewportClassifier) + Send + Sync + 'static,
    {
        self.while_inside = Some(Arc::new(callback));
        self
    }

    pub fn on_leave<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut ViewportClassifier) + Send + Sync + 'static,
    {
        self.on_leave = Some(Arc::new(callback));
        self
    }

    pub fn contains(&self, width: u32) -> bool {
        self.inclusion.contains(f64::from(width), self.min, self.max)
    }

    pub fn callback(&self, phase: Phase) -> Option<&Callback> {
        match phase {
            Phase::Enter => self.on_enter.as_ref(),
            Phase::Inside => self.while_inside.as_ref(),
            Phase::Leave => self.on_leave.as_ref(),
        }
    }

    pub(crate) fn slot_mut(&mut self, phase: Phase) -> &mut Option<Callback> {
        match phase {
            Phase::Enter => &mut self.on_enter,
            Phase::Inside => &mut self.while_inside,
            Phase::Leave => &mut self.on_leave,
        }
    }
}

impl fmt::Debug for RangeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeDefinition")
            .field("min", &self.min)
            .field("max", &self.max)
            .field("inclusion", &self.inclusion)
            .field("on_enter", &self.on_enter.is_some())
            .field("while_inside", &self.while_inside.is_some())
            .field("on_leave", &self.on_leave.is_some())
            .finish()
    }
}

/// Six contiguous `[]` ranges covering every whole width from zero upward.
pub fn builtin_definitions() -> WidthDefinitions {
    let mut defs = WidthDefinitions::new();
    defs.insert("smartwatch".into(), RangeDefinition::inclusive(0.0, 319.0));
    defs.insert("mobile".into(), RangeDefinition::inclusive(320.0, 480.0));
    defs.insert("tablet".into(), RangeDefinition::inclusive(481.0, 768.0));
    defs.insert("laptop".into(), RangeDefinition::inclusive(769.0, 1024.0));
    defs.insert("desktop".into(), RangeDefinition::inclusive(1025.0, 1200.0));
    defs.insert("largedesktop".into(), RangeDefinition::at_least(1201.0));
    defs
}

/// Checks a typed batch. The first violation aborts the whole batch.
pub fn validate_definitions(defs: &WidthDefinitions) -> Result<(), DefinitionError> {
    defs.iter()
        .try_for_each(|(name, def)| validate_range(name, def.min, def.max))
}

pub(crate) fn validate_range(name: &str, min: f64, max: f64) -> Result<(), DefinitionError> {
    // NaN on either side fails the comparison and is rejected here too.
    if min <= max {
        Ok(())
    } else {
        Err(DefinitionError::RangeOrder {
            name: name.to_string(),
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_follow_each_inclusion_mode() {
        let (min, max) = (100.0, 200.0);
        let cases = [
            (Inclusion::Both, true, true),
            (Inclusion::Neither, false, false),
            (Inclusion::MinOnly, true, false),
            (Inclusion::MaxOnly, false, true),
        ];
        for (mode, at_min, at_max) in cases {
            assert_eq!(mode.contains(min, min, max), at_min, "{mode} at min");
            assert_eq!(mode.contains(max, min, max), at_max, "{mode} at max");
            assert!(mode.contains(150.0, min, max), "{mode} interior");
            assert!(!mode.contains(99.0, min, max), "{mode} below");
            assert!(!mode.contains(201.0, min, max), "{mode} above");
        }
    }

    #[test]
    fn tokens_round_trip_through_parse() {
        for mode in Inclusion::ALL {
            assert_eq!(Inclusion::parse(mode.token()), Some(mode));
        }
        for bad in ["<>", "[", "[]]", "][", "", "(("] {
            assert_eq!(Inclusion::parse(bad), None, "{bad:?}");
        }
    }

    #[test]
    fn raw_token_check_rejects_unknown_shapes() {
        assert!(is_width_included("tablet", 500.0, 481.0, 768.0, "[]").unwrap());
        assert!(!is_width_included("tablet", 481.0, 481.0, 768.0, "(]").unwrap());
        let err = is_width_included("tablet", 500.0, 481.0, 768.0, "<>").unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::InvalidInclusion { ref name, ref token } if name == "tablet" && token == "<>"
        ));
    }

    #[test]
    fn phase_tokens_parse() {
        assert_eq!("enter".parse::<Phase>().unwrap(), Phase::Enter);
        assert_eq!("inside".parse::<Phase>().unwrap(), Phase::Inside);
        assert_eq!("leave".parse::<Phase>().unwrap(), Phase::Leave);
        assert!(matches!(
            "exit".parse::<Phase>(),
            Err(ClassifierError::InvalidPhase { ref phase }) if phase == "exit"
        ));
    }

    #[test]
    fn builtins_partition_whole_widths() {
        let defs = builtin_definitions();
        let probes = (0..=5000u32).chain([u32::MAX / 2, u32::MAX]);
        for width in probes {
            let hits = defs.values().filter(|d| d.contains(width)).count();
            assert_eq!(hits, 1, "width {width} matched {hits} breakpoints");
        }
    }

    #[test]
    fn range_order_is_checked_once() {
        let mut defs = WidthDefinitions::new();
        defs.insert("ok".into(), RangeDefinition::inclusive(10.0, 10.0));
        defs.insert("flipped".into(), RangeDefinition::inclusive(500.0, 100.0));
        let err = validate_definitions(&defs).unwrap_err();
        assert_eq!(
            err,
            DefinitionError::RangeOrder {
                name: "flipped".into(),
                min: 500.0,
                max: 100.0
            }
        );
    }

    #[test]
    fn nan_bounds_are_rejected() {
        let mut defs = WidthDefinitions::new();
        defs.insert("nan".into(), RangeDefinition::inclusive(f64::NAN, 10.0));
        assert_eq!(validate_definitions(&defs).unwrap_err().breakpoint(), "nan");
    }
}
