//! Projectile prototypes: the shape, gravity and post-hit observers a pool spawns from.
//!
//! Observers are plain components cloned onto every instance of the prototype at spawn
//! time. The effects plugin reacts to hit/stick messages of projectiles carrying them; the
//! runtime lifecycle never looks at them.

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use super::components::PrototypeId;
use crate::plugins::effects::freeze::FreezeOnHit;
use crate::plugins::effects::lightning::LightningOnHit;

pub const ARROW: &str = "arrow";
pub const FREEZE_ARROW: &str = "freeze_arrow";
pub const LIGHTNING_ARROW: &str = "lightning_arrow";

#[derive(Debug, Clone)]
pub struct ProjectilePrototype {
    pub id: PrototypeId,
    pub gravity_scale: f32,
    pub size: Vec2,
    pub color: Color,
    pub freeze: Option<FreezeOnHit>,
    pub lightning: Option<LightningOnHit>,
}

impl ProjectilePrototype {
    pub fn arrow(name: &str) -> Self {
        Self {
            id: PrototypeId::new(name),
            gravity_scale: 1.0,
            size: Vec2::new(0.6, 0.08),
            color: Color::srgb(0.92, 0.86, 0.7),
            freeze: None,
            lightning: None,
        }
    }

    pub fn with_freeze(mut self, freeze: FreezeOnHit) -> Self {
        self.freeze = Some(freeze);
        self
    }

    pub fn with_lightning(mut self, lightning: LightningOnHit) -> Self {
        self.lightning = Some(lightning);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

#[derive(Resource, Debug, Clone)]
pub struct ProjectilePrototypes {
    default: ProjectilePrototype,
    overrides: HashMap<PrototypeId, ProjectilePrototype>,
}

impl Default for ProjectilePrototypes {
    fn default() -> Self {
        let mut set = Self::new(ProjectilePrototype::arrow(ARROW));
        set.register(
            ProjectilePrototype::arrow(FREEZE_ARROW)
                .with_color(Color::srgb(0.55, 0.85, 1.0))
                .with_freeze(FreezeOnHit::default()),
        );
        set.register(
            ProjectilePrototype::arrow(LIGHTNING_ARROW)
                .with_color(Color::srgb(1.0, 0.95, 0.35))
                .with_lightning(LightningOnHit::default()),
        );
        set
    }
}

impl ProjectilePrototypes {
    pub fn new(default: ProjectilePrototype) -> Self {
        Self { default, overrides: HashMap::default() }
    }

    pub fn register(&mut self, proto: ProjectilePrototype) {
        self.overrides.insert(proto.id.clone(), proto);
    }

    #[inline]
    pub fn default_prototype(&self) -> &ProjectilePrototype {
        &self.default
    }

    #[inline]
    pub fn get(&self, id: &PrototypeId) -> Option<&ProjectilePrototype> {
        if *id == self.default.id {
            return Some(&self.default);
        }
        self.overrides.get(id)
    }

    /// Unknown ids fall back to the default prototype.
    pub fn resolve(&self, id: Option<&PrototypeId>) -> &ProjectilePrototype {
        match id {
            None => &self.default,
            Some(id) => self.get(id).unwrap_or_else(|| {
                warn!("unknown projectile prototype `{id}`, using `{}`", self.default.id);
                &self.default
            }),
        }
    }
}
