/// Protocol shared by the end-to-end tests: a small game world with players,
/// items, teams and a couple of types that only exist to fail on replicas
use synchrony_shared::{
    BitReader, BitWrite, CallbackMode, ConstructorParam, FieldCodec, FloatCodec, PropertyMutator,
    ProtocolPlugin, SchemaBuilder, Serde, SerdeErr, SyncCallback, SyncMap, SyncPolicy, SyncProtocol, SyncRef,
    SyncValue,
};

// Values

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl SyncValue for Vec2 {}

/// Writes both components in full and blends them linearly
pub struct Vec2Codec;

impl FieldCodec<Vec2> for Vec2Codec {
    fn write(&self, value: &Vec2, writer: &mut dyn BitWrite) {
        value.x.ser(writer);
        value.y.ser(writer);
    }

    fn read(&self, reader: &mut BitReader) -> Result<Vec2, SerdeErr> {
        Ok(Vec2 {
            x: f32::de(reader)?,
            y: f32::de(reader)?,
        })
    }

    fn can_interpolate(&self) -> bool {
        true
    }

    fn interpolate(&self, from: &Vec2, to: &Vec2, factor: f32) -> Vec2 {
        let axis = FloatCodec::<f32>::new();
        Vec2 {
            x: axis.interpolate(&from.x, &to.x, factor),
            y: axis.interpolate(&from.y, &to.y, factor),
        }
    }
}

// Objects

pub type Roster = SyncMap<u32, Player>;
pub type Inventory = SyncMap<String, Item>;

#[derive(Default)]
pub struct World {
    pub round: u32,
    pub roster: Option<SyncRef<Roster>>,
    pub featured: Option<SyncRef<Item>>,
    pub turret: Option<SyncRef<Turret>>,
}

pub struct Player {
    name: String,
    pub position: Vec2,
    pub health: u8,
    pub score: u32,
    pub motto: String,
    pub team: Option<SyncRef<Team>>,
    pub inventory: Option<SyncRef<Inventory>>,
    /// Replica only: how often the update callback ran
    pub synchronized: u32,
}

impl Player {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            position: Vec2::default(),
            health: 100,
            score: 0,
            motto: String::new(),
            team: None,
            inventory: None,
            synchronized: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames outside the setter path, so replicas see the change offered
    /// to a construction-only member
    pub fn rename(&mut self, name: &str) {
        self.name = name.to_string();
    }
}

pub struct Team {
    pub name: String,
    /// Replica only: how often the construction callback ran
    pub constructed: u32,
}

impl Team {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            constructed: 0,
        }
    }
}

/// Flags its own mutations, so diff passes only look at flagged members
#[derive(Default)]
pub struct Item {
    label: String,
    weight: u16,
    mutator: Option<PropertyMutator>,
}

impl Item {
    pub fn new(label: &str, weight: u16) -> Self {
        Self {
            label: label.to_string(),
            weight,
            mutator: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn weight(&self) -> u16 {
        self.weight
    }

    pub fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
        self.mutate(0);
    }

    pub fn set_weight(&mut self, weight: u16) {
        self.weight = weight;
        self.mutate(1);
    }

    /// Changes the weight without flagging it
    pub fn set_weight_silently(&mut self, weight: u16) {
        self.weight = weight;
    }

    fn mutate(&self, index: u8) {
        if let Some(mutator) = &self.mutator {
            mutator.mutate(index);
        }
    }
}

/// Service handed to turret constructors on replicas
#[derive(Clone, Debug, PartialEq)]
pub struct Spawner {
    pub region: String,
}

pub struct Turret {
    pub caliber: u16,
    mount: Option<SyncRef<Item>>,
    spawner: Option<Spawner>,
}

impl Turret {
    pub fn new(caliber: u16, mount: Option<SyncRef<Item>>) -> Self {
        Self {
            caliber,
            mount,
            spawner: None,
        }
    }

    pub fn mount(&self) -> Option<&SyncRef<Item>> {
        self.mount.as_ref()
    }

    pub fn spawner(&self) -> Option<&Spawner> {
        self.spawner.as_ref()
    }
}

/// Root of a graph whose constructors depend on each other
#[derive(Default)]
pub struct Nest {
    pub egg: Option<SyncRef<Egg>>,
}

pub struct Egg {
    pub chicken: Option<SyncRef<Chicken>>,
}

pub struct Chicken {
    pub egg: Option<SyncRef<Egg>>,
}

/// Interpolated primitives at magnitudes where blending loses precision
#[derive(Default)]
pub struct Odometer {
    pub trip: f32,
    pub total: u64,
}

/// A member without a setter that no constructor populates
pub struct GetterOnly {
    pub id: u32,
}

/// Registers the dictionary types the world hangs its players and items on
pub struct DictionaryPlugin;

impl ProtocolPlugin for DictionaryPlugin {
    fn build(&self, protocol: &mut SyncProtocol) {
        protocol
            .add_map::<u32, Player>("Roster")
            .add_map::<String, Item>("Inventory");
    }
}

pub fn protocol() -> SyncProtocol {
    let mut protocol = SyncProtocol::builder();
    protocol
        .add_codec::<Vec2, Vec2Codec>(Vec2Codec)
        .add_plugin(DictionaryPlugin)
        .add_type(
            SchemaBuilder::<World>::new("World")
                .value("round", SyncPolicy::TakeSynchronized, |w| w.round, |w, v| w.round = v)
                .reference("roster", SyncPolicy::TakeSynchronized, |w| w.roster.clone(), |w, v| w.roster = v)
                .reference("featured", SyncPolicy::TakeSynchronized, |w| w.featured.clone(), |w, v| w.featured = v)
                .reference("turret", SyncPolicy::TakeSynchronized, |w| w.turret.clone(), |w, v| w.turret = v)
                .default_constructor(),
        )
        .add_type(
            SchemaBuilder::<Player>::new("Player")
                .get_only_value("name", |p| p.name.clone())
                .value("position", SyncPolicy::Interpolated, |p| p.position, |p, v| p.position = v)
                .value("health", SyncPolicy::HighestTick, |p| p.health, |p, v| p.health = v)
                .value("score", SyncPolicy::TakeSynchronized, |p| p.score, |p, v| p.score = v)
                .value("motto", SyncPolicy::Ignore, |p| p.motto.clone(), |p, v| p.motto = v)
                .reference("team", SyncPolicy::TakeSynchronized, |p| p.team.clone(), |p, v| p.team = v)
                .reference(
                    "inventory",
                    SyncPolicy::TakeSynchronized,
                    |p| p.inventory.clone(),
                    |p, v| p.inventory = v,
                )
                .constructor(vec![ConstructorParam::member("name")], |args| {
                    Ok(Player::new(&args.value::<String>("name")?))
                })
                .on_synchronized(SyncCallback::new(
                    "count_synchronization",
                    CallbackMode::EveryUpdate,
                    |p: &mut Player| p.synchronized += 1,
                )),
        )
        .add_type(
            SchemaBuilder::<Team>::new("Team")
                .value("name", SyncPolicy::TakeSynchronized, |t| t.name.clone(), |t, v| t.name = v)
                .constructor(Vec::new(), |_| Ok(Team::new("")))
                .on_synchronized(SyncCallback::new(
                    "count_construction",
                    CallbackMode::Constructed,
                    |t: &mut Team| t.constructed += 1,
                )),
        )
        .add_type(
            SchemaBuilder::<Item>::new("Item")
                .value("label", SyncPolicy::TakeSynchronized, |i| i.label.clone(), |i, v| i.label = v)
                .value("weight", SyncPolicy::TakeSynchronized, |i| i.weight, |i, v| i.weight = v)
                .change_notification(|i, mutator| i.mutator = Some(mutator))
                .default_constructor(),
        )
        .add_type(
            SchemaBuilder::<Turret>::new("Turret")
                .value("caliber", SyncPolicy::TakeSynchronized, |t| t.caliber, |t, v| t.caliber = v)
                .get_only_reference("mount", |t| t.mount.clone())
                .constructor(
                    vec![
                        ConstructorParam::member("mount"),
                        ConstructorParam::dependency::<Spawner>(),
                    ],
                    |args| {
                        let mut turret = Turret::new(0, args.reference("mount")?);
                        turret.spawner = Some(args.dependency::<Spawner>()?);
                        Ok(turret)
                    },
                ),
        )
        .add_type(
            SchemaBuilder::<Nest>::new("Nest")
                .reference("egg", SyncPolicy::TakeSynchronized, |n| n.egg.clone(), |n, v| n.egg = v)
                .default_constructor(),
        )
        .add_type(
            SchemaBuilder::<Egg>::new("Egg")
                .get_only_reference("chicken", |e| e.chicken.clone())
                .constructor(vec![ConstructorParam::member("chicken")], |args| {
                    Ok(Egg {
                        chicken: args.reference("chicken")?,
                    })
                }),
        )
        .add_type(
            SchemaBuilder::<Chicken>::new("Chicken")
                .get_only_reference("egg", |c| c.egg.clone())
                .constructor(vec![ConstructorParam::member("egg")], |args| {
                    Ok(Chicken {
                        egg: args.reference("egg")?,
                    })
                }),
        )
        .add_type(
            SchemaBuilder::<Odometer>::new("Odometer")
                .value("trip", SyncPolicy::Interpolated, |o| o.trip, |o, v| o.trip = v)
                .value("total", SyncPolicy::Interpolated, |o| o.total, |o, v| o.total = v)
                .default_constructor(),
        )
        .add_type(
            SchemaBuilder::<GetterOnly>::new("GetterOnly")
                .get_only_value("id", |g| g.id)
                .constructor(Vec::new(), |_| Ok(GetterOnly { id: 0 })),
        );
    protocol.build()
}
