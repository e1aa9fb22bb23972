//! The keyboard-layout schema the decode and encode tests share.

#![allow(dead_code)]

use core::mem::offset_of;

use bind_json::{
    EnumWidth, FieldDescr, Kind, LenField, LenWidth, Reflect, StrRef, TypeDescr,
};

#[derive(Debug, Clone, Copy)]
pub struct Key {
    pub nob: bool,
    pub index: i16,
    pub label: StrRef,
    pub w: f32,
    pub h: f32,
    pub capcolor_size: i8,
    pub ledcolor_size: i8,
    pub capcolor: *const f32,
    pub ledcolor: *const f32,
}

impl Default for Key {
    fn default() -> Self {
        Key {
            nob: false,
            index: 0,
            label: StrRef::EMPTY,
            w: 80.0,
            h: 80.0,
            capcolor_size: 0,
            ledcolor_size: 0,
            capcolor: core::ptr::null(),
            ledcolor: core::ptr::null(),
        }
    }
}

static KEY_FIELDS: [FieldDescr; 7] = [
    FieldDescr::scalar("nob", Kind::Bool, offset_of!(Key, nob)),
    FieldDescr::scalar("index", Kind::I16, offset_of!(Key, index)),
    FieldDescr::string("label", offset_of!(Key, label)),
    FieldDescr::scalar("w", Kind::F32, offset_of!(Key, w)),
    FieldDescr::scalar("h", Kind::F32, offset_of!(Key, h)),
    FieldDescr::array_ptr(
        "capcolor",
        Kind::F32,
        offset_of!(Key, capcolor),
        LenField {
            offset: offset_of!(Key, capcolor_size),
            width: LenWidth::S8,
        },
    ),
    FieldDescr::array_ptr(
        "ledcolor",
        Kind::F32,
        offset_of!(Key, ledcolor),
        LenField {
            offset: offset_of!(Key, ledcolor_size),
            width: LenWidth::S8,
        },
    ),
];

pub static KEY: TypeDescr = TypeDescr::object::<Key>("key", &KEY_FIELDS);

// Safety: offsets, kinds and placements above mirror Key exactly.
unsafe impl Reflect for Key {
    fn descr() -> &'static TypeDescr {
        &KEY
    }
}

#[derive(Debug, Clone, Copy)]
pub struct KeyGroup {
    pub name: StrRef,
    pub x: f32,
    pub y: f32,
    pub r: i16,
    pub c: i16,
    pub nb_keys: i16,
    pub keys: *const Key,
}

impl Default for KeyGroup {
    fn default() -> Self {
        KeyGroup {
            name: StrRef::EMPTY,
            x: 0.0,
            y: 0.0,
            r: 0,
            c: 0,
            nb_keys: 0,
            keys: core::ptr::null(),
        }
    }
}

static KEYGROUP_FIELDS: [FieldDescr; 6] = [
    FieldDescr::string("name", offset_of!(KeyGroup, name)),
    FieldDescr::scalar("x", Kind::F32, offset_of!(KeyGroup, x)),
    FieldDescr::scalar("y", Kind::F32, offset_of!(KeyGroup, y)),
    FieldDescr::scalar("r", Kind::I16, offset_of!(KeyGroup, r)),
    FieldDescr::scalar("c", Kind::I16, offset_of!(KeyGroup, c)),
    FieldDescr::object_array_ptr(
        "keys",
        offset_of!(KeyGroup, keys),
        &KEY,
        LenField {
            offset: offset_of!(KeyGroup, nb_keys),
            width: LenWidth::S16,
        },
    ),
];

pub static KEYGROUP: TypeDescr = TypeDescr::object::<KeyGroup>("keygroup", &KEYGROUP_FIELDS);

// Safety: offsets, kinds and placements above mirror KeyGroup exactly.
unsafe impl Reflect for KeyGroup {
    fn descr() -> &'static TypeDescr {
        &KEYGROUP
    }
}

pub static KEYBOARD_OPTIONS: TypeDescr = TypeDescr::flag_enum(
    "keyboard_options",
    EnumWidth::E16,
    &["BACKLIGHT", "SPLIT", "WIRELESS", "HOTSWAP"],
);

#[derive(Debug, Clone, Copy)]
pub struct Keyboard {
    pub scale: f32,
    pub key_width: f32,
    pub key_height: f32,
    pub options: u16,
    pub nb_keygroups: i16,
    pub keygroups: *const KeyGroup,
}

impl Default for Keyboard {
    fn default() -> Self {
        Keyboard {
            scale: 1.0,
            key_width: 81.0,
            key_height: 81.0,
            options: 0,
            nb_keygroups: 0,
            keygroups: core::ptr::null(),
        }
    }
}

static KEYBOARD_FIELDS: [FieldDescr; 5] = [
    FieldDescr::scalar("scale", Kind::F32, offset_of!(Keyboard, scale)),
    FieldDescr::scalar("key_width", Kind::F32, offset_of!(Keyboard, key_width)),
    FieldDescr::scalar("key_height", Kind::F32, offset_of!(Keyboard, key_height)),
    FieldDescr::flags(
        "options",
        EnumWidth::E16,
        offset_of!(Keyboard, options),
        &KEYBOARD_OPTIONS,
    ),
    FieldDescr::object_array_ptr(
        "keygroups",
        offset_of!(Keyboard, keygroups),
        &KEYGROUP,
        LenField {
            offset: offset_of!(Keyboard, nb_keygroups),
            width: LenWidth::S16,
        },
    ),
];

pub static KEYBOARD: TypeDescr = TypeDescr::object::<Keyboard>("keyboard", &KEYBOARD_FIELDS);

// Safety: offsets, kinds and placements above mirror Keyboard exactly.
unsafe impl Reflect for Keyboard {
    fn descr() -> &'static TypeDescr {
        &KEYBOARD
    }
}

#[derive(Debug, Clone, Copy)]
pub struct KeyboardRoot {
    pub keyboard: *const Keyboard,
}

impl Default for KeyboardRoot {
    fn default() -> Self {
        KeyboardRoot {
            keyboard: core::ptr::null(),
        }
    }
}

static KEYBOARD_ROOT_FIELDS: [FieldDescr; 1] = [FieldDescr::object_ptr(
    "keyboard",
    offset_of!(KeyboardRoot, keyboard),
    &KEYBOARD,
)];

pub static KEYBOARD_ROOT: TypeDescr =
    TypeDescr::object::<KeyboardRoot>("root", &KEYBOARD_ROOT_FIELDS);

// Safety: offsets, kinds and placements above mirror KeyboardRoot exactly.
unsafe impl Reflect for KeyboardRoot {
    fn descr() -> &'static TypeDescr {
        &KEYBOARD_ROOT
    }
}

/// The sample layout most keyboard tests decode.
pub const KYRIA_JSON: &[u8] = br#"{
  "keyboard": {
    "scale": 1.5,
    "key_width": 80.0,
    "key_height": 80.0,
    "options": "BACKLIGHT|HOTSWAP",
    "keygroups": [
      {
        "name": "left",
        "x": 0.0,
        "y": 10.5,
        "r": 3,
        "c": 2,
        "keys": [
          { "nob": false, "index": 0, "label": "Q", "capcolor": [0.1, 0.2, 0.3, 1.0] },
          { "nob": true, "index": 1, "label": "F", "w": 95.5 }
        ]
      },
      {
        "name": "right",
        "x": 320.25,
        "y": 10.5,
        "r": 3,
        "c": 2,
        "keys": [
          { "index": 2, "label": "J", "ledcolor": [1.0, 1.0, 1.0] }
        ]
      }
    ]
  }
}"#;
