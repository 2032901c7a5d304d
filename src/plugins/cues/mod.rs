//! Fire-and-forget audio/VFX cues.
//!
//! Gameplay writes a `Cue` and moves on. Nothing in the combat core ever waits on a cue or
//! reads one back; the only consumer here traces them. A sound or particle backend would
//! add its own reader.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueKind {
    CastStart,
    Launch,
    Hit,
    GroundStick,
    Jump,
    Charge,
    IcePillar,
    Lightning,
    FreezeOverlay,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct Cue {
    pub kind: CueKind,
    pub at: Vec2,
    pub source: Option<Entity>,
}

impl Cue {
    pub fn new(kind: CueKind, at: Vec2) -> Self {
        Self { kind, at, source: None }
    }

    pub fn from(mut self, source: Entity) -> Self {
        self.source = Some(source);
        self
    }
}

pub fn plugin(app: &mut App) {
    app.add_message::<Cue>()
        .add_systems(PostUpdate, trace_cues);
}

fn trace_cues(mut cues: MessageReader<Cue>) {
    for cue in cues.read() {
        trace!("cue {:?} at {:?} from {:?}", cue.kind, cue.at, cue.source);
    }
}
