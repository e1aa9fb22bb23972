use bind_json::{Decoder, DecoderError, Step, StrRef};
use u8arena::Arena;

fn arenas<'b>(out: &'b mut [u8], scratch: &'b mut [u8]) -> (Arena<'b>, Arena<'b>) {
    (Arena::new(out, "out"), Arena::new(scratch, "scratch"))
}

#[test]
fn test_walk_flat_object() {
    let mut ob = [0u8; 512];
    let mut sb = [0u8; 2048];
    let (out, scratch) = arenas(&mut ob, &mut sb);

    let json = br#"{"nob": true, "index": -3, "label": "Q", "w": 80.5}"#;
    let mut decoder = Decoder::new(json, &out, &scratch).unwrap();

    let mut nob = false;
    let mut index = 0i16;
    let mut label = StrRef::EMPTY;
    let mut w = 0.0f32;
    let mut seen = Vec::new();

    let mut step = decoder.read_object_begin().unwrap();
    while step == Step::Continue {
        seen.push(decoder.field_name().unwrap().to_string());
        if decoder.field_is("nob") {
            decoder.decode_bool(&mut nob);
        } else if decoder.field_is("index") {
            decoder.decode_i16(&mut index);
        } else if decoder.field_is("label") {
            decoder.decode_string(&mut label).unwrap();
        } else if decoder.field_is("w") {
            decoder.decode_f32(&mut w);
        }
        step = decoder.read_object_end().unwrap();
    }

    assert_eq!(seen, vec!["nob", "index", "label", "w"]);
    assert!(nob);
    assert_eq!(index, -3);
    assert_eq!(unsafe { label.as_str() }, "Q");
    assert_eq!(w, 80.5);
}

#[test]
fn test_decode_object_helper() {
    let mut ob = [0u8; 256];
    let mut sb = [0u8; 1024];
    let (out, scratch) = arenas(&mut ob, &mut sb);

    let mut decoder = Decoder::new(br#"{"x": 1, "y": 2}"#, &out, &scratch).unwrap();
    let mut x = 0i32;
    let mut y = 0i32;
    decoder
        .decode_object(|d, name| {
            match name {
                "x" => d.decode_i32(&mut x),
                "y" => d.decode_i32(&mut y),
                _ => {}
            }
            Ok(())
        })
        .unwrap();
    assert_eq!((x, y), (1, 2));
}

#[test]
fn test_nested_objects() {
    let mut ob = [0u8; 512];
    let mut sb = [0u8; 2048];
    let (out, scratch) = arenas(&mut ob, &mut sb);

    let json = br#"{"outer": {"inner": {"value": 42}}, "after": 7}"#;
    let mut decoder = Decoder::new(json, &out, &scratch).unwrap();

    let mut value = 0i64;
    let mut after = 0i64;

    let mut step = decoder.read_object_begin().unwrap();
    while step == Step::Continue {
        if decoder.field_is("outer") {
            let mut inner_step = decoder.read_object_begin().unwrap();
            while inner_step == Step::Continue {
                if decoder.field_is("inner") {
                    let mut deep_step = decoder.read_object_begin().unwrap();
                    while deep_step == Step::Continue {
                        if decoder.field_is("value") {
                            decoder.decode_i64(&mut value);
                        }
                        deep_step = decoder.read_object_end().unwrap();
                    }
                }
                inner_step = decoder.read_object_end().unwrap();
            }
        } else if decoder.field_is("after") {
            decoder.decode_i64(&mut after);
        }
        step = decoder.read_object_end().unwrap();
    }

    assert_eq!(value, 42);
    assert_eq!(after, 7);
}

#[test]
fn test_unvisited_containers_are_skipped() {
    let mut ob = [0u8; 512];
    let mut sb = [0u8; 4096];
    let (out, scratch) = arenas(&mut ob, &mut sb);

    let json = br#"{"skip_me": {"a": [1, 2, {"b": 3}]}, "keep": 9}"#;
    let mut decoder = Decoder::new(json, &out, &scratch).unwrap();

    let mut keep = 0u32;
    decoder
        .decode_object(|d, name| {
            if name == "keep" {
                d.decode_u32(&mut keep);
            }
            Ok(())
        })
        .unwrap();
    assert_eq!(keep, 9);
}

#[test]
fn test_decode_array_into_arena() {
    let mut ob = [0u8; 512];
    let mut sb = [0u8; 2048];
    let (out, scratch) = arenas(&mut ob, &mut sb);

    let json = br#"{"color": [0.25, 0.5, 0.75, 1.0]}"#;
    let mut decoder = Decoder::new(json, &out, &scratch).unwrap();

    let mut color: &[f32] = &[];
    let mut step = decoder.read_object_begin().unwrap();
    while step == Step::Continue {
        if decoder.field_is("color") {
            color = decoder.decode_array::<f32>(8).unwrap();
        }
        step = decoder.read_object_end().unwrap();
    }

    assert_eq!(color, &[0.25, 0.5, 0.75, 1.0]);
}

#[test]
fn test_decode_array_clamps_to_max() {
    let mut ob = [0u8; 512];
    let mut sb = [0u8; 2048];
    let (out, scratch) = arenas(&mut ob, &mut sb);

    let mut decoder = Decoder::new(br#"[1, 2, 3, 4, 5]"#, &out, &scratch).unwrap();
    let values = decoder.decode_array::<u32>(3).unwrap();
    assert_eq!(values, &[1, 2, 3]);
}

#[test]
fn test_decode_carray() {
    let mut ob = [0u8; 256];
    let mut sb = [0u8; 2048];
    let (out, scratch) = arenas(&mut ob, &mut sb);

    let mut decoder = Decoder::new(br#"[10, 20, 30]"#, &out, &scratch).unwrap();
    let mut buffer = [0i32; 8];
    let written = decoder.decode_carray(&mut buffer).unwrap();
    assert_eq!(written, 3);
    assert_eq!(&buffer[..3], &[10, 20, 30]);
}

#[test]
fn test_decode_string_array() {
    let mut ob = [0u8; 512];
    let mut sb = [0u8; 2048];
    let (out, scratch) = arenas(&mut ob, &mut sb);

    let mut decoder = Decoder::new(br#"["alpha", "beta"]"#, &out, &scratch).unwrap();
    let strings = decoder.decode_string_array(4).unwrap();
    assert_eq!(strings.len(), 2);
    assert_eq!(unsafe { strings[0].as_str() }, "alpha");
    assert_eq!(unsafe { strings[1].as_str() }, "beta");
}

#[test]
fn test_decode_str_buf_clamps() {
    let mut ob = [0u8; 256];
    let mut sb = [0u8; 1024];
    let (out, scratch) = arenas(&mut ob, &mut sb);

    let mut decoder = Decoder::new(br#"{"s": "abcdefgh"}"#, &out, &scratch).unwrap();
    let mut step = decoder.read_object_begin().unwrap();
    let mut buffer = [0xffu8; 5];
    while step == Step::Continue {
        if decoder.field_is("s") {
            let n = decoder.decode_str_buf(&mut buffer);
            assert_eq!(n, 4);
        }
        step = decoder.read_object_end().unwrap();
    }
    assert_eq!(&buffer, b"abcd\0");
}

#[test]
fn test_decode_enum_flags() {
    let mut ob = [0u8; 256];
    let mut sb = [0u8; 1024];
    let (out, scratch) = arenas(&mut ob, &mut sb);

    let mut decoder = Decoder::new(br#"{"flags": "A|C"}"#, &out, &scratch).unwrap();
    let mut flags = 0u64;
    decoder
        .decode_object(|d, name| {
            if name == "flags" {
                flags = d.decode_enum_flags(&["A", "B", "C", "D"]);
            }
            Ok(())
        })
        .unwrap();
    assert_eq!(flags, 0b0101);
}

#[test]
fn test_wrong_kind_reads_default() {
    let mut ob = [0u8; 256];
    let mut sb = [0u8; 1024];
    let (out, scratch) = arenas(&mut ob, &mut sb);

    let mut decoder = Decoder::new(br#"{"s": "text"}"#, &out, &scratch).unwrap();
    let mut step = decoder.read_object_begin().unwrap();
    while step == Step::Continue {
        let mut number = 99i32;
        decoder.decode_i32(&mut number);
        assert_eq!(number, 0);

        let mut flag = true;
        decoder.decode_bool(&mut flag);
        assert!(!flag);

        step = decoder.read_object_end().unwrap();
    }
}

#[test]
fn test_begin_on_wrong_kind() {
    let mut ob = [0u8; 256];
    let mut sb = [0u8; 1024];
    let (out, scratch) = arenas(&mut ob, &mut sb);

    let mut decoder = Decoder::new(br#"[1]"#, &out, &scratch).unwrap();
    assert_eq!(
        decoder.read_object_begin().unwrap_err(),
        DecoderError::NotAnObject
    );
    // The root is still there for the right call.
    let (step, size) = decoder.read_array_begin().unwrap();
    assert_eq!(step, Step::Continue);
    assert_eq!(size, 1);
}

#[test]
fn test_scan_error_surfaces() {
    let mut ob = [0u8; 256];
    let mut sb = [0u8; 1024];
    let (out, scratch) = arenas(&mut ob, &mut sb);

    let err = Decoder::new(br#"{"bad": 1.e}"#, &out, &scratch).unwrap_err();
    assert_eq!(err.message, "line 1: bad number");
}
