//! A sign-up flow prototype: welcome, login, and four tabbed pages.
//!
//! Run with `cargo run --example signup_flow`.

use clickthrough::effects::MemoryImageLoader;
use clickthrough::platform::{MemoryPlatform, Navigation};
use clickthrough::{state_tree, Engine, EngineBuilder, EngineError, LayerSpec, Notification};

const SCREENS: [&str; 7] = [
    "welcome",
    "login",
    "login-filled",
    "home",
    "search",
    "likes",
    "profile",
];

fn build() -> Result<Engine<MemoryPlatform>, EngineError> {
    let tree = state_tree! {
        screen: {
            welcome: true,
            login: false,
            "login-filled": false,
            home: false,
            search: false,
            likes: false,
            profile: false,
        },
    };

    let mut engine = EngineBuilder::new()
        .observe(|n: &Notification| println!("  {n}"))
        .build(MemoryPlatform::new(), tree)?;

    for screen in SCREENS {
        engine.add_layer(
            LayerSpec::new()
                .id(screen)
                .visible(&format!("screen:{screen}"))
                .image(format!("img/{screen}@3x.png")),
        )?;
    }

    engine.add_child_layer(
        "welcome",
        LayerSpec::new()
            .id("LoginButton")
            .width(90)
            .height(40)
            .top(555)
            .left(195)
            .click("screen:login"),
    )?;
    engine.add_child_layer(
        "login",
        LayerSpec::new()
            .id("LoginInputs")
            .width(320)
            .height(90)
            .top(310)
            .left(20)
            .click("screen:login-filled"),
    )?;
    engine.add_child_layer(
        "login-filled",
        LayerSpec::new()
            .id("SubmitButton")
            .width(140)
            .height(40)
            .top(415)
            .left(197)
            .click("screen:home"),
    )?;

    engine.add_layer(
        LayerSpec::new()
            .id("Menu")
            .visible("screen:home, screen:search, screen:likes, screen:profile")
            .height(55),
    )?;
    for (i, tab) in ["home", "search", "likes", "profile"].iter().enumerate() {
        engine.add_child_layer(
            "Menu",
            LayerSpec::new()
                .id(format!("Tab-{tab}"))
                .width("25%")
                .left(format!("{}%", i * 25))
                .click(&format!("screen:{tab}")),
        )?;
    }

    Ok(engine)
}

#[tokio::main]
async fn main() -> Result<(), EngineError> {
    let mut engine = build()?;

    let loader = SCREENS.iter().fold(MemoryImageLoader::new(), |loader, screen| {
        loader.with(&format!("img/{screen}@3x.png"), 1125, 2436)
    });
    let sized = engine.load_images(&loader).await;
    let welcome = engine.layer("welcome").map(|l| l.width());
    println!("sized {sized} screens, welcome is {welcome:?} wide");

    for layer in ["LoginButton", "LoginInputs", "SubmitButton", "Tab-likes"] {
        println!("click {layer}");
        engine.click(layer)?;
        println!("  url: {}", engine.platform().location_search());
    }

    println!("back");
    engine.back()?;
    println!("  active: {:?}", engine.active_states().to_vec());
    println!("  menu visible: {}", engine.is_layer_visible("Menu")?);

    Ok(())
}
