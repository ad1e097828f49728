cfg_if! {
    if #[cfg(feature = "verbose")] {
        use log::debug as info;
    } else {
        use log::info;
    }
}

use datasync_core::{
    Driver, DriverError, DriverHandle, DriverResult, Memo, PassSummary, ReconcileError,
    Reconciler, ReconcilerConfig, Watched,
};

const NAMESPACE: &str = "datasync::demo";

/// An entity as it arrives from the outside world each frame
#[derive(Clone, Debug)]
pub struct Character {
    pub name: String,
    pub x: i16,
    pub y: i16,
    pub hidden: bool,
}

impl Character {
    fn new(name: &str, x: i16, y: i16) -> Self {
        Self {
            name: name.to_string(),
            x,
            y,
            hidden: false,
        }
    }
}

/// The "rendered" counterpart of a Character
pub struct Sprite {
    position: (i16, i16),
    draws: u32,
    memo: Memo<i16>,
}

#[derive(Default)]
pub struct SpriteDriver {
    live: usize,
    total_draws: u32,
}

impl SpriteDriver {
    fn draw(&mut self, character: &Character, sprite: &mut Sprite) {
        if !sprite.memo.update(&[character.x, character.y]) {
            return;
        }
        sprite.position = (character.x, character.y);
        sprite.draws += 1;
        self.total_draws += 1;
        info!(
            "Sprite {} drawn at ({}, {})",
            character.name, sprite.position.0, sprite.position.1
        );
    }
}

impl Driver<Character> for SpriteDriver {
    type Component = Sprite;

    fn filter(&self, character: &Character) -> DriverResult<bool> {
        Ok(!character.hidden)
    }

    fn enter(&mut self, character: &Character) -> DriverResult<Option<Sprite>> {
        if character.name.is_empty() {
            return Err(DriverError::msg("characters need a name to get a sprite"));
        }
        self.live += 1;
        info!("Sprite created for {}", character.name);
        Ok(Some(Sprite {
            position: (character.x, character.y),
            draws: 0,
            memo: Memo::new(),
        }))
    }

    fn exit(&mut self, character: &Character, sprite: Option<&mut Sprite>) -> DriverResult<()> {
        if let Some(sprite) = sprite {
            self.live -= 1;
            info!(
                "Sprite for {} released after {} draws",
                character.name, sprite.draws
            );
        }
        Ok(())
    }

    fn update(&mut self, character: &Character, sprite: Option<&mut Sprite>) -> DriverResult<()> {
        if let Some(sprite) = sprite {
            self.draw(character, sprite);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sprites"
    }
}

pub struct App {
    reconciler: Reconciler<Character>,
    sprites: DriverHandle<SpriteDriver>,
    frame: Watched<u32>,
}

impl App {
    pub fn default() -> Self {
        info!("Basic Datasync Demo started");

        let config = ReconcilerConfig::default().debug_namespace(NAMESPACE);
        let mut reconciler =
            Reconciler::with_config(|character: &Character| character.name.clone(), config);
        let sprites = reconciler
            .add_driver(SpriteDriver::default())
            .unwrap_or_else(|err| panic!("{}", err));

        App {
            reconciler,
            sprites,
            frame: Watched::new(NAMESPACE, "frame", 0),
        }
    }

    pub fn is_done(&self) -> bool {
        *self.frame.get() >= 6
    }

    pub fn update(&mut self) -> Result<PassSummary, ReconcileError> {
        let frame = *self.frame.get() + 1;
        self.frame.set(frame);

        let summary = self.reconciler.reconcile(scene(frame))?;
        info!("Frame {}: {}", frame, summary);

        if let Some(driver) = self.reconciler.driver(&self.sprites) {
            info!(
                "Frame {}: {} live sprites, {} draws so far",
                frame, driver.live, driver.total_draws
            );
        }
        Ok(summary)
    }
}

/// Scripted scene: characters walk in, one hides, one leaves, one comes back
fn scene(frame: u32) -> Vec<Option<Character>> {
    let step = frame as i16;
    let mut characters = vec![Some(Character::new("alice", step, 0))];

    if frame >= 2 {
        characters.push(Some(Character::new("bob", 10, 10)));
    }
    if frame < 4 {
        characters.push(Some(Character::new("carol", 0, -step)));
    } else {
        // an empty slot, as left behind by a filtered list
        characters.push(None);
    }
    if frame == 3 {
        characters.push(Some(Character {
            hidden: true,
            ..Character::new("dave", 5, 5)
        }));
    }
    if frame == 6 {
        characters.push(Some(Character::new("carol", 0, 0)));
    }

    characters
}
