use crate::animation::Anim;
use crate::error::FixError;

/// Animation frames per second of server time, shared by every animation.
pub const ANIM_FPS: f64 = 10.0;

pub const AXE_MODEL: &str = "progs/v_axe.mdl";

/// Attack animation played for each first person weapon model.
pub const VIEW_MODEL_ATTACKS: &[(&str, Anim)] = &[
    (AXE_MODEL, Anim::AxAtt),
    ("progs/v_shot.mdl", Anim::ShotAtt),
    ("progs/v_shot2.mdl", Anim::ShotAtt),
    ("progs/v_nail.mdl", Anim::NailAtt),
    ("progs/v_nail2.mdl", Anim::NailAtt),
    ("progs/v_rock.mdl", Anim::RockAtt),
    ("progs/v_rock2.mdl", Anim::RockAtt),
    ("progs/v_light.mdl", Anim::Light),
];

/// The animation set used while a given weapon is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponAnims {
    pub attack: Anim,
    pub melee: bool,
}

impl WeaponAnims {
    pub fn for_view_model(model: &str) -> Result<Self, FixError> {
        let attack = VIEW_MODEL_ATTACKS
            .iter()
            .find(|(name, _)| *name == model)
            .map(|(_, anim)| *anim)
            .ok_or_else(|| FixError::UnknownWeaponModel(model.to_string()))?;

        Ok(Self {
            attack,
            melee: model == AXE_MODEL,
        })
    }

    pub fn pain(&self) -> Anim {
        if self.melee { Anim::AxPain } else { Anim::Pain }
    }

    pub fn run(&self) -> Anim {
        if self.melee { Anim::AxRun } else { Anim::RockRun }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axe_is_melee() {
        let axe = WeaponAnims::for_view_model("progs/v_axe.mdl").unwrap();
        assert_eq!(axe.attack, Anim::AxAtt);
        assert!(axe.melee);
        assert_eq!(axe.pain(), Anim::AxPain);
        assert_eq!(axe.run(), Anim::AxRun);
    }

    #[test]
    fn ranged_weapons() {
        for (model, attack) in [
            ("progs/v_shot2.mdl", Anim::ShotAtt),
            ("progs/v_nail.mdl", Anim::NailAtt),
            ("progs/v_rock2.mdl", Anim::RockAtt),
            ("progs/v_light.mdl", Anim::Light),
        ] {
            let weapon = WeaponAnims::for_view_model(model).unwrap();
            assert_eq!(weapon.attack, attack);
            assert!(!weapon.melee);
            assert_eq!(weapon.pain(), Anim::Pain);
            assert_eq!(weapon.run(), Anim::RockRun);
        }
    }

    #[test]
    fn unknown_weapon_is_fatal() {
        let err = WeaponAnims::for_view_model("progs/v_grapple.mdl").unwrap_err();
        assert!(matches!(err, FixError::UnknownWeaponModel(ref m) if m == "progs/v_grapple.mdl"));
    }
}
