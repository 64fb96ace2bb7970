//! Animation clips and per-object playback state
//!
//! Only playback time is tracked here; pose evaluation is left to the renderer.

/// A named clip in the engine's clip registry
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    /// Length in seconds
    pub length: f32,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, length: f32) -> Self {
        Self {
            name: name.into(),
            length: length.max(0.0),
        }
    }
}

/// Playback of one clip on one object
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationPlayer {
    pub clip: String,
    pub length: f32,
    pub time: f32,
    /// Frames over which the clip blends in
    pub blend_frames: f32,
    /// Blend weight, ramps from 0 to 1 over `blend_frames`
    pub weight: f32,
    pub playing: bool,
}

impl AnimationPlayer {
    pub fn new(clip: &AnimationClip) -> Self {
        Self {
            clip: clip.name.clone(),
            length: clip.length,
            time: 0.0,
            blend_frames: 0.0,
            weight: 1.0,
            playing: false,
        }
    }

    /// Start (or keep) playing, optionally from the beginning
    pub fn play(&mut self, blend_frames: f32, restart: bool) {
        if restart || !self.playing {
            self.time = 0.0;
            self.blend_frames = blend_frames.max(0.0);
            self.weight = if self.blend_frames > 0.0 { 0.0 } else { 1.0 };
        }
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Advance by `delta` seconds, looping at the clip end
    pub fn advance(&mut self, delta: f32) {
        if !self.playing {
            return;
        }
        self.time += delta;
        if self.length > 0.0 {
            self.time %= self.length;
        }
        if self.weight < 1.0 {
            self.weight = (self.weight + 1.0 / self.blend_frames.max(1.0)).min(1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_loops_and_blends() {
        let clip = AnimationClip::new("Walk", 1.0);
        let mut player = AnimationPlayer::new(&clip);
        player.advance(0.5);
        assert_eq!(player.time, 0.0);

        player.play(2.0, false);
        assert_eq!(player.weight, 0.0);
        player.advance(0.75);
        player.advance(0.5);
        assert!((player.time - 0.25).abs() < 1e-5);
        assert_eq!(player.weight, 1.0);
    }

    #[test]
    fn test_play_without_restart_keeps_time() {
        let clip = AnimationClip::new("Idle", 4.0);
        let mut player = AnimationPlayer::new(&clip);
        player.play(0.0, false);
        player.advance(1.0);
        player.play(0.0, false);
        assert_eq!(player.time, 1.0);
        player.play(0.0, true);
        assert_eq!(player.time, 0.0);
    }
}
