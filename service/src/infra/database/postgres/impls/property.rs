//! [`Property`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::{Json, ToSql};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        property::{self, Caption, Image, ImageUrl},
        Property,
    },
    infra::{
        database::{
            self,
            postgres::{Connection, LikePattern},
            Postgres,
        },
        Database,
    },
    read,
};

/// Columns of the `properties` table.
pub(super) const COLUMNS: &str = "\
    properties.id, title, description, \
    kind, category, \
    price, rent_period, available_from, \
    city, area, address, \
    bedrooms, bathrooms, \
    size_value, size_unit, \
    furnishing, condition, \
    status, owner_id, \
    contact_name, contact_phone, contact_email, \
    images, is_featured, \
    created_at, updated_at";

/// [`Image`] representation inside the `images` JSONB column.
#[derive(Debug, Deserialize, Serialize)]
struct ImageRow {
    /// [`ImageUrl`] of the [`Image`].
    url: String,

    /// [`Caption`] of the [`Image`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    caption: Option<String>,
}

impl From<&Image> for ImageRow {
    fn from(image: &Image) -> Self {
        Self {
            url: image.url.to_string(),
            caption: image.caption.as_ref().map(ToString::to_string),
        }
    }
}

impl From<ImageRow> for Image {
    fn from(row: ImageRow) -> Self {
        // SAFETY: Only valid values are stored into the database.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        unsafe {
            Self {
                url: ImageUrl::new_unchecked(row.url),
                caption: row.caption.map(|c| Caption::new_unchecked(c)),
            }
        }
    }
}

/// Converts the provided optional [`property::Rooms`] number into its SQL
/// representation.
fn rooms_to_sql(rooms: Option<property::Rooms>) -> Option<i16> {
    rooms.map(i16::from)
}

/// Reads an optional [`property::Rooms`] number from the provided [`Row`]
/// column.
fn rooms_from_row(row: &Row, column: &str) -> Option<property::Rooms> {
    row.get::<_, Option<i16>>(column)
        .map(property::Rooms::try_from)
        .transpose()
        .unwrap_or_else(|_| panic!("`{column}` overflow"))
}

/// Builds a [`Property`] out of the provided [`Row`] selected with
/// [`COLUMNS`].
pub(super) fn from_row(row: &Row) -> Property {
    let size_value = row.get::<_, Option<property::SizeValue>>("size_value");
    let size_unit = row.get::<_, Option<property::SizeUnit>>("size_unit");

    Property {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        kind: row.get("kind"),
        category: row.get("category"),
        price: row.get("price"),
        rent_period: row.get("rent_period"),
        available_from: row.get("available_from"),
        location: property::Location {
            city: row.get("city"),
            area: row.get("area"),
            address: row.get("address"),
        },
        specifications: property::Specifications {
            bedrooms: rooms_from_row(row, "bedrooms"),
            bathrooms: rooms_from_row(row, "bathrooms"),
        },
        size: size_value
            .zip(size_unit)
            .map(|(value, unit)| property::Size { value, unit }),
        features: property::Features {
            furnishing: row.get("furnishing"),
            condition: row.get("condition"),
        },
        status: row.get("status"),
        owner_id: row.get("owner_id"),
        contact: property::Contact {
            name: row.get("contact_name"),
            phone: row.get("contact_phone"),
            email: row.get("contact_email"),
        },
        images: row
            .get::<_, Json<Vec<ImageRow>>>("images")
            .0
            .into_iter()
            .map(Image::from)
            .collect(),
        is_featured: row.get("is_featured"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<Property>, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties \
             WHERE id = $1::UUID \
             LIMIT 1",
        );
        self.query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C> Database<Insert<Property>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Property>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(property))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Property>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let Property {
            id,
            title,
            description,
            kind,
            category,
            price,
            rent_period,
            available_from,
            location: property::Location {
                city,
                area,
                address,
            },
            specifications: property::Specifications {
                bedrooms,
                bathrooms,
            },
            size,
            features: property::Features {
                furnishing,
                condition,
            },
            status,
            owner_id,
            contact: property::Contact {
                name: contact_name,
                phone: contact_phone,
                email: contact_email,
            },
            images,
            is_featured,
            created_at,
            updated_at,
        } = property;

        let bedrooms = rooms_to_sql(bedrooms);
        let bathrooms = rooms_to_sql(bathrooms);
        let size_value = size.map(|s| s.value);
        let size_unit = size.map(|s| s.unit);
        let images = Json(images.iter().map(ImageRow::from).collect_vec());

        const SQL: &str = "\
            INSERT INTO properties (\
                id, title, description, \
                kind, category, \
                price, rent_period, available_from, \
                city, area, address, \
                bedrooms, bathrooms, \
                size_value, size_unit, \
                furnishing, condition, \
                status, owner_id, \
                contact_name, contact_phone, contact_email, \
                images, is_featured, \
                created_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::TEXT, \
                $4::INT2, $5::INT2, \
                $6::NUMERIC, $7::INT2, $8::TIMESTAMPTZ, \
                $9::VARCHAR, $10::VARCHAR, $11::VARCHAR, \
                $12::INT2, $13::INT2, \
                $14::NUMERIC, $15::INT2, \
                $16::INT2, $17::INT2, \
                $18::INT2, $19::UUID, \
                $20::VARCHAR, $21::VARCHAR, $22::VARCHAR, \
                $23::JSONB, $24::BOOLEAN, \
                $25::TIMESTAMPTZ, $26::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET title = EXCLUDED.title, \
                description = EXCLUDED.description, \
                kind = EXCLUDED.kind, \
                category = EXCLUDED.category, \
                price = EXCLUDED.price, \
                rent_period = EXCLUDED.rent_period, \
                available_from = EXCLUDED.available_from, \
                city = EXCLUDED.city, \
                area = EXCLUDED.area, \
                address = EXCLUDED.address, \
                bedrooms = EXCLUDED.bedrooms, \
                bathrooms = EXCLUDED.bathrooms, \
                size_value = EXCLUDED.size_value, \
                size_unit = EXCLUDED.size_unit, \
                furnishing = EXCLUDED.furnishing, \
                condition = EXCLUDED.condition, \
                status = EXCLUDED.status, \
                contact_name = EXCLUDED.contact_name, \
                contact_phone = EXCLUDED.contact_phone, \
                contact_email = EXCLUDED.contact_email, \
                images = EXCLUDED.images, \
                is_featured = EXCLUDED.is_featured, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &title,
                &description,
                &kind,
                &category,
                &price,
                &rent_period,
                &available_from,
                &city,
                &area,
                &address,
                &bedrooms,
                &bathrooms,
                &size_value,
                &size_unit,
                &furnishing,
                &condition,
                &status,
                &owner_id,
                &contact_name,
                &contact_phone,
                &contact_email,
                &images,
                &is_featured,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Property, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM properties \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Property, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        // `saved_properties` rows are removed by `ON DELETE CASCADE`.
        const SQL: &str = "\
            DELETE FROM properties \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<
        Select<By<read::property::list::Page, read::property::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::property::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::property::list::Page, read::property::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        use read::property::list::Sort;

        let read::property::list::Selector {
            arguments,
            filter:
                read::property::list::Filter {
                    city,
                    area,
                    kind,
                    category,
                    furnishing,
                    min_price,
                    max_price,
                    bedrooms,
                    bathrooms,
                    search,
                    status,
                    sort,
                },
        } = by.into_inner();

        let bedrooms = rooms_to_sql(bedrooms);
        let bathrooms = rooms_to_sql(bathrooms);
        let search =
            search.as_ref().map(|s| LikePattern::containing(s.as_ref()));

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];

        let status_idx = status.as_ref().map(|s| {
            ps.push(s);
            ps.len()
        });
        let city_idx = city.as_ref().map(|c| {
            ps.push(c);
            ps.len()
        });
        let area_idx = area.as_ref().map(|a| {
            ps.push(a);
            ps.len()
        });
        let kind_idx = kind.as_ref().map(|k| {
            ps.push(k);
            ps.len()
        });
        let category_idx = category.as_ref().map(|c| {
            ps.push(c);
            ps.len()
        });
        let furnishing_idx = furnishing.as_ref().map(|f| {
            ps.push(f);
            ps.len()
        });
        let min_price_idx = min_price.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });
        let max_price_idx = max_price.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });
        let bedrooms_idx = bedrooms.as_ref().map(|b| {
            ps.push(b);
            ps.len()
        });
        let bathrooms_idx = bathrooms.as_ref().map(|b| {
            ps.push(b);
            ps.len()
        });
        let search_idx = search.as_ref().map(|s| {
            ps.push(s);
            ps.len()
        });

        let filtering = format!(
            "{status} \
             {city} {area} \
             {kind} {category} {furnishing} \
             {min_price} {max_price} \
             {bedrooms} {bathrooms} \
             {search}",
            status = status_idx.map_or_else(
                || "TRUE".to_owned(),
                |idx| format!("status = ${idx}::INT2"),
            ),
            city = city_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND LOWER(city) = LOWER(${idx}::VARCHAR)"))
            }),
            area = area_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND LOWER(area) = LOWER(${idx}::VARCHAR)"))
            }),
            kind = kind_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND kind = ${idx}::INT2"))
            }),
            category = category_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND category = ${idx}::INT2"))
            }),
            furnishing = furnishing_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND furnishing = ${idx}::INT2"))
            }),
            min_price = min_price_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND price >= ${idx}::NUMERIC"))
            }),
            max_price = max_price_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND price <= ${idx}::NUMERIC"))
            }),
            bedrooms = bedrooms_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND bedrooms >= ${idx}::INT2"))
            }),
            bathrooms = bathrooms_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND bathrooms >= ${idx}::INT2"))
            }),
            search = search_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!(
                    "AND (title ILIKE ${idx}::VARCHAR \
                          OR description ILIKE ${idx}::VARCHAR)"
                ))
            }),
        );
        let filter_params = ps.len();

        let count_sql = format!(
            "SELECT COUNT(*)::INT8 \
             FROM properties \
             WHERE {filtering}",
        );
        let total = self
            .query_opt(&count_sql, &ps[..filter_params])
            .await
            .map_err(tracerr::wrap!())?
            .map_or(0, |row| row.get::<_, i64>(0));

        let limit = i64::from(arguments.limit());
        let offset = i64::try_from(arguments.offset()).unwrap_or(i64::MAX);
        ps.push(&limit);
        let limit_idx = ps.len();
        ps.push(&offset);
        let offset_idx = ps.len();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties \
             WHERE {filtering} \
             ORDER BY {key} {order}, id ASC \
             LIMIT ${limit_idx}::INT8 \
             OFFSET ${offset_idx}::INT8",
            key = match sort {
                Sort::Newest | Sort::Oldest => "created_at",
                Sort::PriceAsc | Sort::PriceDesc => "price",
            },
            order = sort.order().sql(),
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        Ok(read::property::list::Page::new(
            arguments,
            rows.iter().map(from_row),
            u64::try_from(total).unwrap_or_default(),
        ))
    }
}

impl<C>
    Database<
        Select<
            By<read::property::owned::Page, read::property::owned::Selector>,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::property::owned::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::property::owned::Page, read::property::owned::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::property::owned::Selector {
            arguments,
            filter: owner_id,
        } = by.into_inner();

        const COUNT_SQL: &str = "\
            SELECT COUNT(*)::INT8 \
            FROM properties \
            WHERE owner_id = $1::UUID";
        let total = self
            .query_opt(COUNT_SQL, &[&owner_id])
            .await
            .map_err(tracerr::wrap!())?
            .map_or(0, |row| row.get::<_, i64>(0));

        let limit = i64::from(arguments.limit());
        let offset = i64::try_from(arguments.offset()).unwrap_or(i64::MAX);
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties \
             WHERE owner_id = $1::UUID \
             ORDER BY created_at DESC, id ASC \
             LIMIT $2::INT8 \
             OFFSET $3::INT8",
        );
        let rows = self
            .query(&sql, &[&owner_id, &limit, &offset])
            .await
            .map_err(tracerr::wrap!())?;

        Ok(read::property::owned::Page::new(
            arguments,
            rows.iter().map(from_row),
            u64::try_from(total).unwrap_or_default(),
        ))
    }
}

impl<C> Database<Select<By<read::property::featured::List, ()>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::property::featured::List;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::property::featured::List, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let limit = i64::try_from(read::property::featured::LIMIT)
            .unwrap_or(i64::MAX);

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties \
             WHERE is_featured \
               AND status = $1::INT2 \
             ORDER BY created_at DESC, id ASC \
             LIMIT $2::INT8",
        );
        self.query(&sql, &[&property::Status::Available, &limit])
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| rows.iter().map(from_row).collect_vec().into())
    }
}
