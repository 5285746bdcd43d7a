use scene_ngin::color::Color;

fn close(a: Color, b: Color) -> bool {
    (a.r - b.r).abs() < 1e-5 && (a.g - b.g).abs() < 1e-5 && (a.b - b.b).abs() < 1e-5
}

#[test]
fn hex_literals_are_converted_to_linear() {
    assert!(close(Color::from_hex(0xff0000), Color::linear(1.0, 0.0, 0.0)));
    assert!(close(Color::from(0xffffff), Color::WHITE));
    let grey = Color::from_hex(0x808080);
    // sRGB 0.5 is about 0.214 in linear space
    assert!((grey.r - 0.2158605).abs() < 1e-4, "{grey:?}");
}

#[test]
fn parses_hex_strings_and_names() {
    assert!(close(Color::parse("#ff88cc").unwrap(), Color::from_hex(0xff88cc)));
    assert!(close(Color::parse("#f8c").unwrap(), Color::from_hex(0xff88cc)));
    assert!(close(Color::parse("orange").unwrap(), Color::from_hex(0xffa500)));
    assert!(close(Color::parse(" Red ").unwrap(), Color::linear(1.0, 0.0, 0.0)));
}

#[test]
fn rejects_malformed_colours() {
    assert!(Color::parse("#ff88c").is_err());
    assert!(Color::parse("#gg0000").is_err());
    // signs are not hex digits
    assert!(Color::parse("#+12345").is_err());
    assert!(Color::parse("#+12").is_err());
    assert!(Color::parse("#-1").is_err());
    assert!(Color::parse("not-a-colour").is_err());
}

#[test]
fn converts_to_a_clear_colour() {
    let clear: wgpu::Color = Color::linear(0.25, 0.5, 1.0).into();
    assert_eq!(clear.r, 0.25);
    assert_eq!(clear.b, 1.0);
    assert_eq!(clear.a, 1.0);
}
