//! Serialized form of a dynamic frame: its kind and the indices of its bodies in
//! the ephemeris.

use serde::{Deserialize, Serialize};

use super::{
    BarycentricRotating, BodyCentredBodyDirection, BodyCentredNonRotating, BodySurface,
    FrameDefinition,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DynamicFrameMessage {
    BarycentricRotating { primary: usize, secondary: usize },
    BodyCentredBodyDirection { primary: usize, secondary: usize },
    BodyCentredNonRotating { centre: usize },
    BodySurface { centre: usize },
}

impl From<FrameDefinition> for DynamicFrameMessage {
    fn from(definition: FrameDefinition) -> Self {
        match definition {
            FrameDefinition::BarycentricRotating(BarycentricRotating { primary, secondary }) => {
                DynamicFrameMessage::BarycentricRotating { primary, secondary }
            }
            FrameDefinition::BodyCentredBodyDirection(BodyCentredBodyDirection {
                primary,
                secondary,
            }) => DynamicFrameMessage::BodyCentredBodyDirection { primary, secondary },
            FrameDefinition::BodyCentredNonRotating(BodyCentredNonRotating { centre }) => {
                DynamicFrameMessage::BodyCentredNonRotating { centre }
            }
            FrameDefinition::BodySurface(BodySurface { centre }) => {
                DynamicFrameMessage::BodySurface { centre }
            }
        }
    }
}

impl From<DynamicFrameMessage> for FrameDefinition {
    fn from(message: DynamicFrameMessage) -> Self {
        match message {
            DynamicFrameMessage::BarycentricRotating { primary, secondary } => {
                FrameDefinition::BarycentricRotating(BarycentricRotating { primary, secondary })
            }
            DynamicFrameMessage::BodyCentredBodyDirection { primary, secondary } => {
                FrameDefinition::BodyCentredBodyDirection(BodyCentredBodyDirection {
                    primary,
                    secondary,
                })
            }
            DynamicFrameMessage::BodyCentredNonRotating { centre } => {
                FrameDefinition::BodyCentredNonRotating(BodyCentredNonRotating { centre })
            }
            DynamicFrameMessage::BodySurface { centre } => {
                FrameDefinition::BodySurface(BodySurface { centre })
            }
        }
    }
}

#[cfg(test)]
mod message_test {
    use super::*;

    #[test]
    fn test_json_form() {
        let message = DynamicFrameMessage::BarycentricRotating {
            primary: 3,
            secondary: 0,
        };
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(json, r#"{"kind":"barycentric_rotating","primary":3,"secondary":0}"#);
        assert_eq!(
            serde_json::from_str::<DynamicFrameMessage>(r#"{"kind":"body_surface","centre":2}"#)
                .unwrap(),
            DynamicFrameMessage::BodySurface { centre: 2 }
        );
        assert!(serde_json::from_str::<DynamicFrameMessage>(r#"{"kind":"body_surface"}"#).is_err());
    }
}
