// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visual channels.

use core::fmt;

use vizlite_data::DataType;

/// A visual property a data field can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    /// Horizontal position.
    X,
    /// Vertical position.
    Y,
    /// Symbol area.
    Size,
    /// Fill or stroke colour.
    Color,
    /// Opacity in `[0, 1]`.
    Opacity,
    /// Symbol shape.
    Shape,
    /// Hover text.
    Tooltip,
    /// Label of a text mark.
    Text,
    /// Draw order.
    Order,
    /// Facet column.
    Column,
    /// Facet row.
    Row,
}

/// What a channel is used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelRole {
    /// `x`, `y`.
    Position,
    /// `size`, `opacity`.
    Magnitude,
    /// `color`, `shape`.
    Identity,
    /// `tooltip`, `text`.
    Annotation,
    /// `order`.
    Sequencing,
    /// `column`, `row`.
    Partition,
}

impl Channel {
    /// All channels, in canonical order.
    pub const ALL: [Self; 11] = [
        Self::X,
        Self::Y,
        Self::Size,
        Self::Color,
        Self::Opacity,
        Self::Shape,
        Self::Tooltip,
        Self::Text,
        Self::Order,
        Self::Column,
        Self::Row,
    ];

    /// Returns the lowercase channel name.
    pub fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Size => "size",
            Self::Color => "color",
            Self::Opacity => "opacity",
            Self::Shape => "shape",
            Self::Tooltip => "tooltip",
            Self::Text => "text",
            Self::Order => "order",
            Self::Column => "column",
            Self::Row => "row",
        }
    }

    /// Parses a channel name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Returns the channel's role.
    pub fn role(self) -> ChannelRole {
        match self {
            Self::X | Self::Y => ChannelRole::Position,
            Self::Size | Self::Opacity => ChannelRole::Magnitude,
            Self::Color | Self::Shape => ChannelRole::Identity,
            Self::Tooltip | Self::Text => ChannelRole::Annotation,
            Self::Order => ChannelRole::Sequencing,
            Self::Column | Self::Row => ChannelRole::Partition,
        }
    }

    /// Whether field bindings on this channel get a synthesized scale.
    pub fn has_scale(self) -> bool {
        matches!(
            self.role(),
            ChannelRole::Position | ChannelRole::Magnitude | ChannelRole::Identity
        )
    }

    /// Whether the channel accepts a field of type `data_type`.
    pub fn accepts(self, data_type: DataType) -> bool {
        use DataType::{Nominal, Ordinal, Quantitative, Temporal};
        match self {
            Self::X | Self::Y | Self::Color | Self::Tooltip | Self::Text | Self::Order => true,
            Self::Size | Self::Opacity => matches!(data_type, Quantitative | Ordinal | Temporal),
            Self::Shape => data_type == Nominal,
            Self::Column | Self::Row => matches!(data_type, Nominal | Ordinal),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn names_round_trip() {
        for c in Channel::ALL {
            assert_eq!(Channel::from_name(c.name()), Some(c));
        }
        assert_eq!(Channel::from_name("fill"), None);
    }

    #[test]
    fn compatibility_table() {
        assert!(Channel::Color.accepts(DataType::Quantitative));
        assert!(!Channel::Shape.accepts(DataType::Quantitative));
        assert!(!Channel::Shape.accepts(DataType::Ordinal));
        assert!(!Channel::Size.accepts(DataType::Nominal));
        assert!(Channel::Opacity.accepts(DataType::Temporal));
        assert!(!Channel::Column.accepts(DataType::Temporal));
        assert!(Channel::Row.accepts(DataType::Ordinal));
    }
}
