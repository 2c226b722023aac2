use piedra_papel_tijera::{
    storage::{
        KeyValueStore,
        THEME_KEY,
    },
    test_helpers::*,
    theme::ThemePreference,
};

#[test]
fn theme__fresh_session_follows_dark_ambient() {
    let ctx = TestContext::new();

    let theme = ctx.theme(Some(ThemePreference::Dark));

    assert_eq!(ThemePreference::Dark, theme.current());
    assert_eq!("switch to light", theme.toggle_label());
    // nothing is stored until the user toggles
    assert_eq!(None, ctx.store().get_item(THEME_KEY).unwrap());
}

#[test]
fn theme__toggle_survives_a_new_session() {
    let ctx = TestContext::new();
    // given
    let mut theme = ctx.theme(None);

    // when
    theme.toggle().unwrap();

    // then
    let resumed = ctx.theme(Some(ThemePreference::Light));
    assert_eq!(ThemePreference::Dark, resumed.current());
}

#[test]
fn theme__double_toggle_is_an_involution() {
    for ambient in [ThemePreference::Light, ThemePreference::Dark] {
        let ctx = TestContext::new();
        let mut theme = ctx.theme(Some(ambient));
        let palette = theme.palette();
        let label = theme.toggle_label();

        theme.toggle().unwrap();
        theme.toggle().unwrap();

        assert_eq!(ambient, theme.current());
        assert_eq!(palette, theme.palette());
        assert_eq!(label, theme.toggle_label());
        assert_eq!(
            Some(ambient.token().to_owned()),
            ctx.store().get_item(THEME_KEY).unwrap()
        );
    }
}
