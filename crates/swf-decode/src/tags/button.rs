use tracing::debug;

use crate::actions::{decode_action_stream, ActionList};
use crate::bits::{BitCursor, Located};
use crate::context::DecodeContext;
use crate::error::Result;
use crate::primitives::{read_flag, read_ui16};
use crate::structures::button::{
    decode_button_cond_actions, decode_button_records, ButtonCondAction, ButtonRecord,
};
use crate::structures::color::{decode_cxform, ColorTransform};
use crate::structures::sound::{decode_sound_info, SoundInfo};

#[derive(Debug, Clone, PartialEq)]
pub struct DefineButton {
    pub button_id: Located<u16>,
    pub characters: Vec<ButtonRecord>,
    /// Run when the button is released.
    pub actions: ActionList,
}

pub(super) fn decode_define_button(
    c: &mut BitCursor<'_>,
    ctx: &mut DecodeContext,
) -> Result<DefineButton> {
    let button_id = read_ui16(c)?;
    let characters = decode_button_records(c, false)?;
    let actions = decode_action_stream(c, ctx)?;
    Ok(DefineButton {
        button_id,
        characters,
        actions,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefineButton2 {
    pub button_id: Located<u16>,
    pub track_as_menu: Located<bool>,
    /// Distance from this field to the first condition action; `0` when
    /// there are none.
    pub action_offset: Located<u16>,
    pub characters: Vec<ButtonRecord>,
    pub actions: Vec<ButtonCondAction>,
}

pub(super) fn decode_define_button2(
    c: &mut BitCursor<'_>,
    ctx: &mut DecodeContext,
) -> Result<DefineButton2> {
    let button_id = read_ui16(c)?;
    let _reserved = c.read_bits(7)?;
    let track_as_menu = read_flag(c)?;
    let action_offset = read_ui16(c)?;
    let characters = decode_button_records(c, true)?;

    let actions = if action_offset.value == 0 {
        Vec::new()
    } else {
        let expected = action_offset.position.byte + usize::from(action_offset.value);
        let here = c.position().byte;
        if expected != here {
            debug!(
                button_id = button_id.value,
                expected,
                here,
                "button action offset disagrees with decoded records"
            );
        }
        decode_button_cond_actions(c, ctx)?
    };

    Ok(DefineButton2 {
        button_id,
        track_as_menu,
        action_offset,
        characters,
        actions,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefineButtonCxform {
    pub button_id: Located<u16>,
    pub color_transform: ColorTransform,
}

pub(super) fn decode_define_button_cxform(c: &mut BitCursor<'_>) -> Result<DefineButtonCxform> {
    Ok(DefineButtonCxform {
        button_id: read_ui16(c)?,
        color_transform: decode_cxform(c)?,
    })
}

/// Sound for one button transition; `sound_id` 0 means none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonSound {
    pub sound_id: Located<u16>,
    pub info: Option<SoundInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineButtonSound {
    pub button_id: Located<u16>,
    pub over_up_to_idle: ButtonSound,
    pub idle_to_over_up: ButtonSound,
    pub over_up_to_over_down: ButtonSound,
    pub over_down_to_over_up: ButtonSound,
}

fn decode_button_sound(c: &mut BitCursor<'_>) -> Result<ButtonSound> {
    let sound_id = read_ui16(c)?;
    let info = if sound_id.value == 0 {
        None
    } else {
        Some(decode_sound_info(c)?)
    };
    Ok(ButtonSound { sound_id, info })
}

pub(super) fn decode_define_button_sound(c: &mut BitCursor<'_>) -> Result<DefineButtonSound> {
    Ok(DefineButtonSound {
        button_id: read_ui16(c)?,
        over_up_to_idle: decode_button_sound(c)?,
        idle_to_over_up: decode_button_sound(c)?,
        over_up_to_over_down: decode_button_sound(c)?,
        over_down_to_over_up: decode_button_sound(c)?,
    })
}
