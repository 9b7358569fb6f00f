//! Control and metadata tags.

use bitflags::bitflags;

use crate::bits::{BitCursor, Located};
use crate::error::Result;
use crate::primitives::{
    check_count, read_encoded_u32, read_rest, read_string, read_ui16, read_ui32, read_ui8,
    SwfString,
};
use crate::structures::color::{decode_rgb, Color};
use crate::structures::geometry::{decode_rect, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetBackgroundColor {
    pub color: Color,
}

pub(super) fn decode_set_background_color(c: &mut BitCursor<'_>) -> Result<SetBackgroundColor> {
    Ok(SetBackgroundColor {
        color: decode_rgb(c)?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLabel {
    pub name: Located<SwfString>,
    /// SWF 6+ named anchor flag; absent in older files.
    pub named_anchor: Option<Located<u8>>,
}

pub(super) fn decode_frame_label(c: &mut BitCursor<'_>) -> Result<FrameLabel> {
    let name = read_string(c)?;
    let named_anchor = if c.is_empty() {
        None
    } else {
        Some(read_ui8(c)?)
    };
    Ok(FrameLabel { name, named_anchor })
}

/// Body of `Protect`, `EnableDebugger` and `EnableDebugger2`: an optional
/// MD5-hashed password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Password {
    /// `EnableDebugger2` reserved field.
    pub reserved: Option<Located<u16>>,
    pub hash: Option<Located<SwfString>>,
}

pub(super) fn decode_password(c: &mut BitCursor<'_>, has_reserved: bool) -> Result<Password> {
    let reserved = if has_reserved {
        Some(read_ui16(c)?)
    } else {
        None
    };
    let hash = if c.is_empty() {
        None
    } else {
        Some(read_string(c)?)
    };
    Ok(Password { reserved, hash })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptLimits {
    pub max_recursion_depth: Located<u16>,
    pub script_timeout_seconds: Located<u16>,
}

pub(super) fn decode_script_limits(c: &mut BitCursor<'_>) -> Result<ScriptLimits> {
    Ok(ScriptLimits {
        max_recursion_depth: read_ui16(c)?,
        script_timeout_seconds: read_ui16(c)?,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetTabIndex {
    pub depth: Located<u16>,
    pub tab_index: Located<u16>,
}

pub(super) fn decode_set_tab_index(c: &mut BitCursor<'_>) -> Result<SetTabIndex> {
    Ok(SetTabIndex {
        depth: read_ui16(c)?,
        tab_index: read_ui16(c)?,
    })
}

bitflags! {
    /// `FileAttributes` flags, in bit-field order.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct FileAttributeFlags: u32 {
        const USE_DIRECT_BLIT = 1 << 30;
        const USE_GPU = 1 << 29;
        const HAS_METADATA = 1 << 28;
        const ACTION_SCRIPT_3 = 1 << 27;
        const USE_NETWORK = 1 << 24;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileAttributes {
    pub flags: Located<FileAttributeFlags>,
}

pub(super) fn decode_file_attributes(c: &mut BitCursor<'_>) -> Result<FileAttributes> {
    let position = c.position();
    let raw = c.read_bits(32)?;
    Ok(FileAttributes {
        flags: Located::new(FileAttributeFlags::from_bits_retain(raw), position),
    })
}

/// Character id paired with a name, used by export, import and symbol lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub character_id: Located<u16>,
    pub name: Located<SwfString>,
}

fn decode_asset_refs(c: &mut BitCursor<'_>) -> Result<Vec<AssetRef>> {
    let count = usize::from(read_ui16(c)?.value);
    check_count(c, count, 3, "asset count")?;
    let mut assets = Vec::with_capacity(count);
    for _ in 0..count {
        assets.push(AssetRef {
            character_id: read_ui16(c)?,
            name: read_string(c)?,
        });
    }
    Ok(assets)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportAssets {
    pub assets: Vec<AssetRef>,
}

pub(super) fn decode_export_assets(c: &mut BitCursor<'_>) -> Result<ExportAssets> {
    Ok(ExportAssets {
        assets: decode_asset_refs(c)?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolClass {
    pub symbols: Vec<AssetRef>,
}

pub(super) fn decode_symbol_class(c: &mut BitCursor<'_>) -> Result<SymbolClass> {
    Ok(SymbolClass {
        symbols: decode_asset_refs(c)?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportAssets {
    /// 1 for `ImportAssets`, 2 for `ImportAssets2`.
    pub version: u8,
    pub url: Located<SwfString>,
    /// `ImportAssets2` reserved bytes.
    pub reserved: Option<(Located<u8>, Located<u8>)>,
    pub assets: Vec<AssetRef>,
}

pub(super) fn decode_import_assets(c: &mut BitCursor<'_>, version: u8) -> Result<ImportAssets> {
    let url = read_string(c)?;
    let reserved = if version >= 2 {
        Some((read_ui8(c)?, read_ui8(c)?))
    } else {
        None
    };
    Ok(ImportAssets {
        version,
        url,
        reserved,
        assets: decode_asset_refs(c)?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// XMP document.
    pub xml: Located<SwfString>,
}

pub(super) fn decode_metadata(c: &mut BitCursor<'_>) -> Result<Metadata> {
    Ok(Metadata {
        xml: read_string(c)?,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefineScalingGrid {
    pub character_id: Located<u16>,
    pub splitter: Rect,
}

pub(super) fn decode_define_scaling_grid(c: &mut BitCursor<'_>) -> Result<DefineScalingGrid> {
    Ok(DefineScalingGrid {
        character_id: read_ui16(c)?,
        splitter: decode_rect(c)?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    pub frame_offset: Located<u32>,
    pub name: Located<SwfString>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLabelEntry {
    pub frame: Located<u32>,
    pub label: Located<SwfString>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineSceneAndFrameLabelData {
    pub scenes: Vec<Scene>,
    pub frame_labels: Vec<FrameLabelEntry>,
}

pub(super) fn decode_define_scene_and_frame_label_data(
    c: &mut BitCursor<'_>,
) -> Result<DefineSceneAndFrameLabelData> {
    let scene_count = read_encoded_u32(c)?.value as usize;
    check_count(c, scene_count, 2, "scene count")?;
    let mut scenes = Vec::with_capacity(scene_count);
    for _ in 0..scene_count {
        scenes.push(Scene {
            frame_offset: read_encoded_u32(c)?,
            name: read_string(c)?,
        });
    }

    let label_count = read_encoded_u32(c)?.value as usize;
    check_count(c, label_count, 2, "frame label count")?;
    let mut frame_labels = Vec::with_capacity(label_count);
    for _ in 0..label_count {
        frame_labels.push(FrameLabelEntry {
            frame: read_encoded_u32(c)?,
            label: read_string(c)?,
        });
    }
    Ok(DefineSceneAndFrameLabelData {
        scenes,
        frame_labels,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineBinaryData {
    pub character_id: Located<u16>,
    pub reserved: Located<u32>,
    pub data: Located<Vec<u8>>,
}

pub(super) fn decode_define_binary_data(c: &mut BitCursor<'_>) -> Result<DefineBinaryData> {
    Ok(DefineBinaryData {
        character_id: read_ui16(c)?,
        reserved: read_ui32(c)?,
        data: read_rest(c)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_label_anchor_is_optional() {
        let mut c = BitCursor::new(b"intro\0");
        assert!(decode_frame_label(&mut c).unwrap().named_anchor.is_none());

        let mut c = BitCursor::new(b"intro\0\x01");
        let label = decode_frame_label(&mut c).unwrap();
        assert_eq!(label.name.value, "intro");
        assert_eq!(label.named_anchor.map(|a| a.value), Some(1));
    }

    #[test]
    fn protect_without_password() {
        let mut c = BitCursor::new(&[]);
        let p = decode_password(&mut c, false).unwrap();
        assert!(p.hash.is_none() && p.reserved.is_none());
    }

    #[test]
    fn file_attributes_bits() {
        let mut c = BitCursor::new(&[0b0001_1001, 0, 0, 0]);
        let attrs = decode_file_attributes(&mut c).unwrap();
        assert_eq!(
            attrs.flags.value,
            FileAttributeFlags::HAS_METADATA
                | FileAttributeFlags::ACTION_SCRIPT_3
                | FileAttributeFlags::USE_NETWORK
        );
    }

    #[test]
    fn scene_and_label_data() {
        let bytes = b"\x01\x00Scene 1\0\x02\x00a\0\x0Ab\0";
        let mut c = BitCursor::new(bytes);
        let data = decode_define_scene_and_frame_label_data(&mut c).unwrap();
        assert!(c.is_empty());
        assert_eq!(data.scenes[0].name.value, "Scene 1");
        let labels: Vec<_> = data
            .frame_labels
            .iter()
            .map(|l| (l.frame.value, l.label.value.to_string()))
            .collect();
        assert_eq!(labels, vec![(0, "a".to_string()), (10, "b".to_string())]);
    }

    #[test]
    fn export_count_is_checked_before_allocating() {
        let mut c = BitCursor::new(&[0xFF, 0xFF, 0x01]);
        assert!(decode_export_assets(&mut c).is_err());
    }
}
