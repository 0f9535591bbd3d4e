#![allow(dead_code)]

use rust_decimal::Decimal;
use time::{Date, Duration, OffsetDateTime, Time};
use uuid::Uuid;
use wirekit::{
    AdditionalData, AdditionalDataHolder, BackedModel, BackingStore, DiscriminatorMapping,
    DiscriminatorRegistry, EnumMember, FieldDeserializers, FlagBits, Parsable, ParseNode,
    ParseNodeExt, Result, SerializationWriter, SerializationWriterExt, WireEnum,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Active,
    Suspended,
    PendingReview,
}

impl WireEnum for Status {
    const MEMBERS: &'static [EnumMember<Self>] = &[
        EnumMember::new(Status::Active, "Active"),
        EnumMember::new(Status::Suspended, "Suspended"),
        EnumMember::renamed(Status::PendingReview, "PendingReview", "pending-review"),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Permissions(pub u64);

impl Permissions {
    pub const NONE: Permissions = Permissions(0);
    pub const READ: Permissions = Permissions(1);
    pub const WRITE: Permissions = Permissions(2);
    pub const SHARE: Permissions = Permissions(4);
    pub const ADMIN: Permissions = Permissions(8);

    pub fn union(self, other: Permissions) -> Permissions {
        Permissions(self.0 | other.0)
    }
}

impl WireEnum for Permissions {
    const MEMBERS: &'static [EnumMember<Self>] = &[
        EnumMember::new(Permissions::NONE, "none"),
        EnumMember::new(Permissions::READ, "read"),
        EnumMember::new(Permissions::WRITE, "write"),
        EnumMember::renamed(Permissions::SHARE, "Share", "share-link"),
        EnumMember::new(Permissions::ADMIN, "admin"),
    ];
    const FLAGS: Option<FlagBits<Self>> = Some(FlagBits {
        to_bits: |p| p.0,
        from_bits: Permissions,
    });
}

/// A plain model exercising every scalar kind plus additional data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestEntity {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub age: Option<i32>,
    pub rank: Option<i64>,
    pub level: Option<u8>,
    pub offset: Option<i8>,
    pub ratio: Option<f32>,
    pub score: Option<f64>,
    pub price: Option<Decimal>,
    pub active: Option<bool>,
    pub created: Option<OffsetDateTime>,
    pub birthday: Option<Date>,
    pub start_time: Option<Time>,
    pub tenure: Option<Duration>,
    pub guid: Option<Uuid>,
    pub photo: Option<Vec<u8>>,
    pub status: Option<Status>,
    pub permissions: Option<Permissions>,
    pub tags: Option<Vec<String>>,
    pub lucky_numbers: Option<Vec<i32>>,
    pub past_statuses: Option<Vec<Status>>,
    pub manager: Option<Box<TestEntity>>,
    pub colleagues: Option<Vec<TestEntity>>,
    pub additional_data: AdditionalData,
}

impl TestEntity {
    pub fn create(_node: &dyn ParseNode) -> Result<Self> {
        Ok(Self::default())
    }
}

impl Parsable for TestEntity {
    fn get_field_deserializers(&self) -> FieldDeserializers<Self> {
        FieldDeserializers::<Self>::new()
            .field("id", |e, n| {
                e.id = n.get_string_value()?;
                Ok(())
            })
            .field("displayName", |e, n| {
                e.display_name = n.get_string_value()?;
                Ok(())
            })
            .field("age", |e, n| {
                e.age = n.get_int_value()?;
                Ok(())
            })
            .field("rank", |e, n| {
                e.rank = n.get_long_value()?;
                Ok(())
            })
            .field("level", |e, n| {
                e.level = n.get_byte_value()?;
                Ok(())
            })
            .field("offset", |e, n| {
                e.offset = n.get_sbyte_value()?;
                Ok(())
            })
            .field("ratio", |e, n| {
                e.ratio = n.get_float_value()?;
                Ok(())
            })
            .field("score", |e, n| {
                e.score = n.get_double_value()?;
                Ok(())
            })
            .field("price", |e, n| {
                e.price = n.get_decimal_value()?;
                Ok(())
            })
            .field("active", |e, n| {
                e.active = n.get_bool_value()?;
                Ok(())
            })
            .field("created", |e, n| {
                e.created = n.get_date_time_offset_value()?;
                Ok(())
            })
            .field("birthday", |e, n| {
                e.birthday = n.get_date_value()?;
                Ok(())
            })
            .field("startTime", |e, n| {
                e.start_time = n.get_time_value()?;
                Ok(())
            })
            .field("tenure", |e, n| {
                e.tenure = n.get_time_span_value()?;
                Ok(())
            })
            .field("guid", |e, n| {
                e.guid = n.get_guid_value()?;
                Ok(())
            })
            .field("photo", |e, n| {
                e.photo = n.get_byte_array_value()?;
                Ok(())
            })
            .field("status", |e, n| {
                e.status = n.get_enum_value()?;
                Ok(())
            })
            .field("permissions", |e, n| {
                e.permissions = n.get_enum_value()?;
                Ok(())
            })
            .field("tags", |e, n| {
                e.tags = n.get_collection_of_primitive_values()?;
                Ok(())
            })
            .field("luckyNumbers", |e, n| {
                e.lucky_numbers = n.get_collection_of_primitive_values()?;
                Ok(())
            })
            .field("pastStatuses", |e, n| {
                e.past_statuses = n.get_collection_of_enum_values()?;
                Ok(())
            })
            .field("manager", |e, n| {
                e.manager = n.get_object_value(TestEntity::create)?.map(Box::new);
                Ok(())
            })
            .field("colleagues", |e, n| {
                e.colleagues = n.get_collection_of_object_values(TestEntity::create)?;
                Ok(())
            })
    }

    fn serialize(&self, writer: &mut dyn SerializationWriter) -> Result<()> {
        writer.write_string_value(Some("id"), self.id.as_deref())?;
        writer.write_string_value(Some("displayName"), self.display_name.as_deref())?;
        writer.write_int_value(Some("age"), self.age)?;
        writer.write_long_value(Some("rank"), self.rank)?;
        writer.write_byte_value(Some("level"), self.level)?;
        writer.write_sbyte_value(Some("offset"), self.offset)?;
        writer.write_float_value(Some("ratio"), self.ratio)?;
        writer.write_double_value(Some("score"), self.score)?;
        writer.write_decimal_value(Some("price"), self.price)?;
        writer.write_bool_value(Some("active"), self.active)?;
        writer.write_date_time_offset_value(Some("created"), self.created)?;
        writer.write_date_value(Some("birthday"), self.birthday)?;
        writer.write_time_value(Some("startTime"), self.start_time)?;
        writer.write_time_span_value(Some("tenure"), self.tenure)?;
        writer.write_guid_value(Some("guid"), self.guid)?;
        writer.write_byte_array_value(Some("photo"), self.photo.as_deref())?;
        writer.write_enum_value(Some("status"), self.status)?;
        writer.write_enum_value(Some("permissions"), self.permissions)?;
        writer.write_collection_of_primitive_values(Some("tags"), self.tags.as_deref())?;
        writer.write_collection_of_primitive_values(
            Some("luckyNumbers"),
            self.lucky_numbers.as_deref(),
        )?;
        writer.write_collection_of_enum_values(Some("pastStatuses"), self.past_statuses.as_deref())?;
        writer.write_object_value(Some("manager"), self.manager.as_deref())?;
        writer.write_collection_of_object_values(Some("colleagues"), self.colleagues.as_deref())?;
        writer.write_additional_data(&self.additional_data)
    }

    fn as_additional_data_holder(&self) -> Option<&dyn AdditionalDataHolder> {
        Some(self)
    }

    fn as_additional_data_holder_mut(&mut self) -> Option<&mut dyn AdditionalDataHolder> {
        Some(self)
    }
}

impl AdditionalDataHolder for TestEntity {
    fn additional_data(&self) -> &AdditionalData {
        &self.additional_data
    }

    fn additional_data_mut(&mut self) -> &mut AdditionalData {
        &mut self.additional_data
    }
}

/// A model whose properties live in a backing store, keyed by wire name.
#[derive(Debug, Default)]
pub struct BackedEntity {
    store: BackingStore,
}

impl BackedEntity {
    pub fn create(_node: &dyn ParseNode) -> Result<Self> {
        Ok(Self::default())
    }

    pub fn id(&self) -> Option<&str> {
        self.store.get::<String>("id").map(String::as_str)
    }

    pub fn set_id(&mut self, value: Option<String>) {
        self.store.set("id", value);
    }

    pub fn display_name(&self) -> Option<&str> {
        self.store.get::<String>("displayName").map(String::as_str)
    }

    pub fn set_display_name(&mut self, value: Option<String>) {
        self.store.set("displayName", value);
    }

    pub fn job_title(&self) -> Option<&str> {
        self.store.get::<String>("jobTitle").map(String::as_str)
    }

    pub fn set_job_title(&mut self, value: Option<String>) {
        self.store.set("jobTitle", value);
    }

    pub fn manager(&self) -> Option<&BackedEntity> {
        self.store.get::<BackedEntity>("manager")
    }

    pub fn manager_mut(&mut self) -> Option<&mut BackedEntity> {
        self.store.get_mut::<BackedEntity>("manager")
    }

    pub fn set_manager(&mut self, value: Option<BackedEntity>) {
        self.store.set_backed_model("manager", value);
    }

    pub fn reports(&self) -> Option<&[BackedEntity]> {
        self.store
            .get::<Vec<BackedEntity>>("reports")
            .map(Vec::as_slice)
    }

    pub fn set_reports(&mut self, value: Option<Vec<BackedEntity>>) {
        self.store.set_backed_collection("reports", value);
    }
}

impl Parsable for BackedEntity {
    fn get_field_deserializers(&self) -> FieldDeserializers<Self> {
        FieldDeserializers::<Self>::new()
            .field("id", |e, n| {
                e.set_id(n.get_string_value()?);
                Ok(())
            })
            .field("displayName", |e, n| {
                e.set_display_name(n.get_string_value()?);
                Ok(())
            })
            .field("jobTitle", |e, n| {
                e.set_job_title(n.get_string_value()?);
                Ok(())
            })
            .field("manager", |e, n| {
                e.set_manager(n.get_object_value(BackedEntity::create)?);
                Ok(())
            })
            .field("reports", |e, n| {
                e.set_reports(n.get_collection_of_object_values(BackedEntity::create)?);
                Ok(())
            })
    }

    fn serialize(&self, writer: &mut dyn SerializationWriter) -> Result<()> {
        writer.write_string_value(Some("id"), self.id())?;
        writer.write_string_value(Some("displayName"), self.display_name())?;
        writer.write_string_value(Some("jobTitle"), self.job_title())?;
        writer.write_object_value(Some("manager"), self.manager())?;
        writer.write_collection_of_object_values(Some("reports"), self.reports())
    }

    fn as_backed_model(&self) -> Option<&dyn BackedModel> {
        Some(self)
    }

    fn as_backed_model_mut(&mut self) -> Option<&mut dyn BackedModel> {
        Some(self)
    }
}

impl BackedModel for BackedEntity {
    fn backing_store(&self) -> &BackingStore {
        &self.store
    }

    fn backing_store_mut(&mut self) -> &mut BackingStore {
        &mut self.store
    }
}

/// Fields shared by every directory object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryBase {
    pub id: Option<String>,
    pub odata_type: Option<String>,
}

impl DirectoryBase {
    fn field_deserializers() -> FieldDeserializers<Self> {
        FieldDeserializers::<DirectoryBase>::new()
            .field("id", |b: &mut DirectoryBase, n| {
                b.id = n.get_string_value()?;
                Ok(())
            })
            .field("@odata.type", |b: &mut DirectoryBase, n| {
                b.odata_type = n.get_string_value()?;
                Ok(())
            })
    }

    fn serialize(&self, writer: &mut dyn SerializationWriter) -> Result<()> {
        writer.write_string_value(Some("@odata.type"), self.odata_type.as_deref())?;
        writer.write_string_value(Some("id"), self.id.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub base: DirectoryBase,
    pub mail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub base: DirectoryBase,
    pub member_count: Option<i32>,
}

/// A polymorphic base: the payload's `@odata.type` picks the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryObject {
    Base(DirectoryBase),
    User(User),
    Group(Group),
}

pub const USER_TYPE: &str = "#microsoft.graph.user";
pub const GROUP_TYPE: &str = "#microsoft.graph.group";

impl DirectoryObject {
    pub fn create(_node: &dyn ParseNode) -> Result<Self> {
        Ok(DirectoryObject::Base(DirectoryBase::default()))
    }

    pub fn create_user(_node: &dyn ParseNode) -> Result<Self> {
        Ok(DirectoryObject::User(User::default()))
    }

    pub fn create_group(_node: &dyn ParseNode) -> Result<Self> {
        Ok(DirectoryObject::Group(Group::default()))
    }

    pub fn mapping() -> DiscriminatorMapping<DirectoryObject> {
        DiscriminatorMapping::new()
            .with(USER_TYPE, DirectoryObject::create_user)
            .with(GROUP_TYPE, DirectoryObject::create_group)
    }

    pub fn register(registry: &DiscriminatorRegistry) {
        registry.register_mapping(Self::mapping());
    }

    pub fn base(&self) -> &DirectoryBase {
        match self {
            DirectoryObject::Base(base) => base,
            DirectoryObject::User(user) => &user.base,
            DirectoryObject::Group(group) => &group.base,
        }
    }

    fn base_mut(&mut self) -> &mut DirectoryBase {
        match self {
            DirectoryObject::Base(base) => base,
            DirectoryObject::User(user) => &mut user.base,
            DirectoryObject::Group(group) => &mut group.base,
        }
    }
}

impl Parsable for DirectoryObject {
    fn get_field_deserializers(&self) -> FieldDeserializers<Self> {
        let base = DirectoryBase::field_deserializers().project(|o: &mut DirectoryObject| {
            Some(o.base_mut())
        });
        match self {
            DirectoryObject::Base(_) => base,
            DirectoryObject::User(_) => base.extend(
                FieldDeserializers::new()
                    .field("mail", |u: &mut User, n| {
                        u.mail = n.get_string_value()?;
                        Ok(())
                    })
                    .project(|o: &mut DirectoryObject| match o {
                        DirectoryObject::User(user) => Some(user),
                        _ => None,
                    }),
            ),
            DirectoryObject::Group(_) => base.extend(
                FieldDeserializers::new()
                    .field("memberCount", |g: &mut Group, n| {
                        g.member_count = n.get_int_value()?;
                        Ok(())
                    })
                    .project(|o: &mut DirectoryObject| match o {
                        DirectoryObject::Group(group) => Some(group),
                        _ => None,
                    }),
            ),
        }
    }

    fn serialize(&self, writer: &mut dyn SerializationWriter) -> Result<()> {
        self.base().serialize(writer)?;
        match self {
            DirectoryObject::Base(_) => Ok(()),
            DirectoryObject::User(user) => {
                writer.write_string_value(Some("mail"), user.mail.as_deref())
            }
            DirectoryObject::Group(group) => {
                writer.write_int_value(Some("memberCount"), group.member_count)
            }
        }
    }
}

/// A flat model for the form and text codecs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contact {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub subscribed: Option<bool>,
    pub topics: Option<Vec<String>>,
    pub status: Option<Status>,
}

impl Contact {
    pub fn create(_node: &dyn ParseNode) -> Result<Self> {
        Ok(Self::default())
    }
}

impl Parsable for Contact {
    fn get_field_deserializers(&self) -> FieldDeserializers<Self> {
        FieldDeserializers::<Self>::new()
            .field("name", |c, n| {
                c.name = n.get_string_value()?;
                Ok(())
            })
            .field("age", |c, n| {
                c.age = n.get_int_value()?;
                Ok(())
            })
            .field("subscribed", |c, n| {
                c.subscribed = n.get_bool_value()?;
                Ok(())
            })
            .field("topics", |c, n| {
                c.topics = n.get_collection_of_primitive_values()?;
                Ok(())
            })
            .field("status", |c, n| {
                c.status = n.get_enum_value()?;
                Ok(())
            })
    }

    fn serialize(&self, writer: &mut dyn SerializationWriter) -> Result<()> {
        writer.write_string_value(Some("name"), self.name.as_deref())?;
        writer.write_int_value(Some("age"), self.age)?;
        writer.write_bool_value(Some("subscribed"), self.subscribed)?;
        writer.write_collection_of_primitive_values(Some("topics"), self.topics.as_deref())?;
        writer.write_enum_value(Some("status"), self.status)
    }
}
