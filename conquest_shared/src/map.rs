use enum_map::{Enum, EnumMap};

#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, enum_map::Enum, enumn::N)]
pub enum RegionId {
    Mithlond,
    Fornarnor,
    Shire,
    Cardolan,
    Imladris,
    Angrenost,
    TaurENdaedalos,
    Lothlorien,
    Fangorn,
    Rohan,
    Rhovanion,
    PinnathGelin,
    MinasTirith,
    Ithilien,
    Gorgoroth,
    Nurn,
}

impl RegionId {
    pub const ALL: [Self; <Self as enum_map::Enum>::LENGTH] = const {
        let mut values = unsafe { [std::mem::transmute::<u8, Self>(0); Self::LENGTH] };

        let mut i = 0;
        while i < Self::LENGTH {
            values[i] = unsafe { std::mem::transmute::<u8, Self>(i as u8) };

            i += 1;
        }

        values
    };

    pub const fn continent(self) -> ContinentId {
        CONTINENTS.as_array()[self as usize]
    }

    pub const fn name(self) -> &'static str {
        [
            "Mithlond",
            "Fornarnor",
            "Shire",
            "Cardolan",
            "Imladris",
            "Angrenost",
            "Taur-e-Ndaedalos",
            "Lothlorien",
            "Fangorn",
            "Rohan",
            "Rhovanion",
            "Pinnath Gelin",
            "Minas Tirith",
            "Ithilien",
            "Gorgoroth",
            "Nurn",
        ][self as usize]
    }
}

pub const REGION_COUNT: usize = <RegionId as Enum>::LENGTH;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, enumn::N, enum_map::Enum)]
#[repr(u8)]
pub enum ContinentId {
    Eriador,
    RohanRhovanion,
    Gondor,
    Mordor,
}

impl ContinentId {
    pub const ALL: [Self; 4] = [
        Self::Eriador,
        Self::RohanRhovanion,
        Self::Gondor,
        Self::Mordor,
    ];

    pub const fn region_count(self) -> u32 {
        [6, 5, 3, 2][self as usize]
    }

    pub const fn bonus(self) -> u32 {
        [4, 3, 2, 1][self as usize]
    }

    pub fn iter_regions(self) -> impl Iterator<Item = RegionId> {
        RegionId::ALL
            .into_iter()
            .filter(move |x| x.continent() == self)
    }
}

macro_rules! edge_arrays {
    ($($origin:expr => {
        $($dest:expr,)*
    },)*) => {
        const {
            let mut array: [&[$crate::map::RegionId]; <$crate::map::RegionId as ::enum_map::Enum>::LENGTH] = [&[]; <$crate::map::RegionId as ::enum_map::Enum>::LENGTH];
            $(
                array[$origin as ::core::primitive::usize] = &[
                    $($dest,)*
                ];
            )*

            array
        }
    };
}

pub const EDGES: EnumMap<RegionId, &[RegionId]> = EnumMap::from_array(edge_arrays! {
    RegionId::Mithlond => {
        RegionId::Fornarnor,
        RegionId::Shire,
        RegionId::Cardolan,
    },
    RegionId::Fornarnor => {
        RegionId::Mithlond,
        RegionId::Shire,
        RegionId::Cardolan,
        RegionId::Imladris,
        RegionId::TaurENdaedalos,
    },
    RegionId::Shire => {
        RegionId::Mithlond,
        RegionId::Fornarnor,
        RegionId::Cardolan,
    },
    RegionId::Cardolan => {
        RegionId::Mithlond,
        RegionId::Fornarnor,
        RegionId::Shire,
        RegionId::Imladris,
        RegionId::Angrenost,
    },
    RegionId::Imladris => {
        RegionId::Fornarnor,
        RegionId::Cardolan,
        RegionId::Angrenost,
        RegionId::TaurENdaedalos,
        RegionId::Lothlorien,
    },
    RegionId::Angrenost => {
        RegionId::Cardolan,
        RegionId::Imladris,
        RegionId::Lothlorien,
        RegionId::Fangorn,
        RegionId::Rohan,
        RegionId::PinnathGelin,
    },
    RegionId::TaurENdaedalos => {
        RegionId::Fornarnor,
        RegionId::Imladris,
        RegionId::Lothlorien,
        RegionId::Rhovanion,
    },
    RegionId::Lothlorien => {
        RegionId::Imladris,
        RegionId::Angrenost,
        RegionId::TaurENdaedalos,
        RegionId::Fangorn,
        RegionId::Rohan,
        RegionId::Rhovanion,
    },
    RegionId::Fangorn => {
        RegionId::Angrenost,
        RegionId::Lothlorien,
        RegionId::Rohan,
    },
    RegionId::Rohan => {
        RegionId::Angrenost,
        RegionId::Lothlorien,
        RegionId::Fangorn,
        RegionId::Rhovanion,
        RegionId::PinnathGelin,
        RegionId::MinasTirith,
        RegionId::Ithilien,
    },
    RegionId::Rhovanion => {
        RegionId::TaurENdaedalos,
        RegionId::Lothlorien,
        RegionId::Rohan,
        RegionId::Ithilien,
        RegionId::Gorgoroth,
        RegionId::Nurn,
    },
    RegionId::PinnathGelin => {
        RegionId::Angrenost,
        RegionId::Rohan,
        RegionId::MinasTirith,
    },
    RegionId::MinasTirith => {
        RegionId::Rohan,
        RegionId::PinnathGelin,
        RegionId::Ithilien,
    },
    RegionId::Ithilien => {
        RegionId::Rohan,
        RegionId::Rhovanion,
        RegionId::MinasTirith,
        RegionId::Gorgoroth,
        RegionId::Nurn,
    },
    RegionId::Gorgoroth => {
        RegionId::Rhovanion,
        RegionId::Ithilien,
        RegionId::Nurn,
    },
    RegionId::Nurn => {
        RegionId::Rhovanion,
        RegionId::Ithilien,
        RegionId::Gorgoroth,
    },
});

macro_rules! const_enum_map {
    ($($region:expr => $continent:expr,)*) => {
        const {
            let mut i = 0;
            $(
                if i != $region as ::core::primitive::usize {
                    ::core::panic!("Enum entries must be in order");
                }
                i += 1;
            )*

                let _ = i; // Silence unused warning
            ::enum_map::EnumMap::from_array([
                $($continent,)*
            ])
        }
    };
}

const CONTINENTS: EnumMap<RegionId, ContinentId> = const_enum_map! {
    RegionId::Mithlond => ContinentId::Eriador,
    RegionId::Fornarnor => ContinentId::Eriador,
    RegionId::Shire => ContinentId::Eriador,
    RegionId::Cardolan => ContinentId::Eriador,
    RegionId::Imladris => ContinentId::Eriador,
    RegionId::Angrenost => ContinentId::Eriador,
    RegionId::TaurENdaedalos => ContinentId::RohanRhovanion,
    RegionId::Lothlorien => ContinentId::RohanRhovanion,
    RegionId::Fangorn => ContinentId::RohanRhovanion,
    RegionId::Rohan => ContinentId::RohanRhovanion,
    RegionId::Rhovanion => ContinentId::RohanRhovanion,
    RegionId::PinnathGelin => ContinentId::Gondor,
    RegionId::MinasTirith => ContinentId::Gondor,
    RegionId::Ithilien => ContinentId::Gondor,
    RegionId::Gorgoroth => ContinentId::Mordor,
    RegionId::Nurn => ContinentId::Mordor,
};

/// Panics if any edge lacks its reverse edge. Map data is fixed at compile
/// time, so an asymmetry is a programming error, not a runtime condition.
pub fn assert_symmetric_edges() {
    for region in RegionId::ALL {
        for &neighbor in EDGES[region] {
            assert!(
                EDGES[neighbor].contains(&region),
                "Asymmetric map edge: {:?} -> {:?}",
                region,
                neighbor,
            );
        }
    }
}
